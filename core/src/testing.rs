//! In-memory DICOM fixtures for unit tests

use crate::parser::dictionary::{
    self, Attribute, CONTOUR_IMAGE_SEQUENCE, FRAME_OF_REFERENCE_UID,
    REFERENCED_FRAME_OF_REFERENCE_SEQUENCE, REFERENCED_RT_PLAN_SEQUENCE, REFERENCED_SOP_CLASS_UID,
    REFERENCED_SOP_INSTANCE_UID, REFERENCED_STRUCTURE_SET_SEQUENCE, RT_REFERENCED_SERIES_SEQUENCE,
    RT_REFERENCED_STUDY_SEQUENCE,
};
use crate::parser::{parse_bytes, ParseOutcome, ParsedFile};
use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::uids;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};

const STUDY_SOP_CLASS: &str = "1.2.840.10008.3.1.2.3.1";

fn text(obj: &mut InMemDicomObject, attr: &Attribute, vr: VR, value: &str) {
    obj.put(DataElement::new(attr.tag, vr, PrimitiveValue::from(value)));
}

fn sequence(obj: &mut InMemDicomObject, attr: &Attribute, items: Vec<InMemDicomObject>) {
    obj.put(DataElement::new(
        attr.tag,
        VR::SQ,
        DataSetSequence::from(items),
    ));
}

fn reference(sop_class: &str, sop_instance: &str) -> InMemDicomObject {
    let mut item = InMemDicomObject::new_empty();
    text(&mut item, &REFERENCED_SOP_CLASS_UID, VR::UI, sop_class);
    text(&mut item, &REFERENCED_SOP_INSTANCE_UID, VR::UI, sop_instance);
    item
}

fn base(study: &str, series: &str, sop: &str, modality: &str, sop_class: &str) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    text(&mut obj, &dictionary::SOP_CLASS_UID, VR::UI, sop_class);
    text(&mut obj, &dictionary::SOP_INSTANCE_UID, VR::UI, sop);
    text(&mut obj, &dictionary::STUDY_INSTANCE_UID, VR::UI, study);
    text(&mut obj, &dictionary::SERIES_INSTANCE_UID, VR::UI, series);
    text(&mut obj, &dictionary::MODALITY, VR::CS, modality);
    text(&mut obj, &dictionary::PATIENT_ID, VR::LO, "PAT001");
    text(&mut obj, &dictionary::PATIENT_SEX, VR::CS, "M");
    text(&mut obj, &dictionary::PATIENT_BIRTH_DATE, VR::DA, "19700101");
    text(&mut obj, &dictionary::STUDY_DATE, VR::DA, "20240105");
    obj
}

fn write(obj: InMemDicomObject, sop_class: &str, sop: &str) -> Vec<u8> {
    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(sop_class)
                .media_storage_sop_instance_uid(sop),
        )
        .expect("fixture meta should be complete");
    let mut bytes = Vec::new();
    file.write_all(&mut bytes)
        .expect("fixture should serialize");
    bytes
}

/// CT image with description "Planning CT"
pub fn ct_file(study: &str, series: &str, sop: &str) -> Vec<u8> {
    let mut obj = base(study, series, sop, "CT", uids::CT_IMAGE_STORAGE);
    text(&mut obj, &dictionary::SERIES_DESCRIPTION, VR::LO, "Planning CT");
    text(&mut obj, &dictionary::SERIES_DATE, VR::DA, "20240105");
    text(&mut obj, &dictionary::KVP, VR::DS, "120");
    obj.put(DataElement::new(
        dictionary::ROWS.tag,
        VR::US,
        PrimitiveValue::from(512_u16),
    ));
    write(obj, uids::CT_IMAGE_STORAGE, sop)
}

/// Image of a modality that takes no part in RT linking
pub fn other_file(study: &str, series: &str, sop: &str, modality: &str) -> Vec<u8> {
    let obj = base(study, series, sop, modality, uids::MR_IMAGE_STORAGE);
    write(obj, uids::MR_IMAGE_STORAGE, sop)
}

/// Structure set referencing `contour_sops` of CT series `ct_series`
/// through the nested frame of reference chain
pub fn rtstruct_file(
    study: &str,
    series: &str,
    sop: &str,
    ct_series: &str,
    contour_sops: &[&str],
) -> Vec<u8> {
    let mut obj = base(study, series, sop, "RTSTRUCT", uids::RT_STRUCTURE_SET_STORAGE);
    text(&mut obj, &dictionary::STRUCTURE_SET_LABEL, VR::SH, &format!("RS {sop}"));

    let contours = contour_sops
        .iter()
        .map(|ct| reference(uids::CT_IMAGE_STORAGE, ct))
        .collect();
    let mut referenced_series = InMemDicomObject::new_empty();
    text(&mut referenced_series, &dictionary::SERIES_INSTANCE_UID, VR::UI, ct_series);
    sequence(&mut referenced_series, &CONTOUR_IMAGE_SEQUENCE, contours);

    let mut referenced_study = reference(STUDY_SOP_CLASS, study);
    sequence(
        &mut referenced_study,
        &RT_REFERENCED_SERIES_SEQUENCE,
        vec![referenced_series],
    );

    let mut frame = InMemDicomObject::new_empty();
    text(&mut frame, &FRAME_OF_REFERENCE_UID, VR::UI, "1.2.826.0.1.9");
    sequence(&mut frame, &RT_REFERENCED_STUDY_SEQUENCE, vec![referenced_study]);

    sequence(&mut obj, &REFERENCED_FRAME_OF_REFERENCE_SEQUENCE, vec![frame]);
    write(obj, uids::RT_STRUCTURE_SET_STORAGE, sop)
}

/// Plan referencing the given structure sets
pub fn rtplan_file(study: &str, series: &str, sop: &str, structure_sets: &[&str]) -> Vec<u8> {
    let mut obj = base(study, series, sop, "RTPLAN", uids::RT_PLAN_STORAGE);
    text(&mut obj, &dictionary::RT_PLAN_LABEL, VR::SH, &format!("Plan {sop}"));
    let items = structure_sets
        .iter()
        .map(|rs| reference(uids::RT_STRUCTURE_SET_STORAGE, rs))
        .collect();
    sequence(&mut obj, &REFERENCED_STRUCTURE_SET_SEQUENCE, items);
    write(obj, uids::RT_PLAN_STORAGE, sop)
}

/// Dose referencing the given plans
pub fn rtdose_file(study: &str, series: &str, sop: &str, plans: &[&str]) -> Vec<u8> {
    let mut obj = base(study, series, sop, "RTDOSE", uids::RT_DOSE_STORAGE);
    text(&mut obj, &dictionary::DOSE_UNITS, VR::CS, "GY");
    let items = plans
        .iter()
        .map(|rp| reference(uids::RT_PLAN_STORAGE, rp))
        .collect();
    sequence(&mut obj, &REFERENCED_RT_PLAN_SEQUENCE, items);
    write(obj, uids::RT_DOSE_STORAGE, sop)
}

/// Portal image referencing the given plans
pub fn rtimage_file(study: &str, series: &str, sop: &str, plans: &[&str]) -> Vec<u8> {
    let mut obj = base(study, series, sop, "RTIMAGE", uids::RT_IMAGE_STORAGE);
    text(&mut obj, &dictionary::RT_IMAGE_LABEL, VR::SH, &format!("Image {sop}"));
    let items = plans
        .iter()
        .map(|rp| reference(uids::RT_PLAN_STORAGE, rp))
        .collect();
    sequence(&mut obj, &REFERENCED_RT_PLAN_SEQUENCE, items);
    write(obj, uids::RT_IMAGE_STORAGE, sop)
}

/// DICOMDIR
pub fn directory_file() -> Vec<u8> {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        Tag(0x0004, 0x1130),
        VR::CS,
        PrimitiveValue::from("FILESET"),
    ));
    write(obj, uids::MEDIA_STORAGE_DIRECTORY_STORAGE, "1.2.826.0.1.7")
}

/// Appends an element whose 32-bit length has the sign bit set
pub fn with_negative_length(mut bytes: Vec<u8>) -> Vec<u8> {
    bytes.extend_from_slice(&[0x09, 0x00, 0x10, 0x10]);
    bytes.extend_from_slice(b"OB");
    bytes.extend_from_slice(&[0x00, 0x00]);
    bytes.extend_from_slice(&0xFFFF_FFF0_u32.to_le_bytes());
    bytes
}

/// Parses fixture bytes that are known to hold a regular file
pub fn parsed(bytes: &[u8]) -> ParsedFile {
    match parse_bytes(bytes) {
        Ok(ParseOutcome::File(parsed)) => parsed,
        other => panic!("fixture did not parse as a regular file: {:?}", other),
    }
}
