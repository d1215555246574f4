//! Static attribute dictionary
//!
//! Maps the symbolic attribute names used throughout the crate to their
//! standard DICOM tags. The parser only extracts attributes listed here;
//! everything else in a file is ignored.

use crate::types::Modality;
use dicom_core::Tag;

/// How an attribute value is extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Single (possibly backslash-separated) string value
    Text,
    /// Sequence of nested attribute mappings
    Sequence,
}

/// Information level an attribute belongs to
///
/// Patient, study and series level values are expected to be identical on
/// every instance of a series; instance level values vary by definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Patient,
    Study,
    Series,
    Instance,
}

/// A named DICOM attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub tag: Tag,
    pub kind: AttributeKind,
    pub level: Level,
}

impl Attribute {
    const fn text(name: &'static str, tag: Tag, level: Level) -> Self {
        Self {
            name,
            tag,
            kind: AttributeKind::Text,
            level,
        }
    }

    const fn sequence(name: &'static str, tag: Tag) -> Self {
        Self {
            name,
            tag,
            kind: AttributeKind::Sequence,
            level: Level::Instance,
        }
    }

    /// Canonical code string, e.g. `x0020000d`
    pub fn code(&self) -> String {
        format!("x{:04x}{:04x}", self.tag.0, self.tag.1)
    }

    /// Whether this attribute is expected to agree across a series
    pub fn is_shared(&self) -> bool {
        self.kind == AttributeKind::Text && self.level != Level::Instance
    }
}

// SOP Common
pub const SOP_CLASS_UID: Attribute =
    Attribute::text("SOPClassUID", Tag(0x0008, 0x0016), Level::Instance);
pub const SOP_INSTANCE_UID: Attribute =
    Attribute::text("SOPInstanceUID", Tag(0x0008, 0x0018), Level::Instance);
pub const MANUFACTURER: Attribute =
    Attribute::text("Manufacturer", Tag(0x0008, 0x0070), Level::Series);

// Patient
pub const PATIENT_NAME: Attribute =
    Attribute::text("PatientName", Tag(0x0010, 0x0010), Level::Patient);
pub const PATIENT_ID: Attribute = Attribute::text("PatientID", Tag(0x0010, 0x0020), Level::Patient);
pub const PATIENT_BIRTH_DATE: Attribute =
    Attribute::text("PatientBirthDate", Tag(0x0010, 0x0030), Level::Patient);
pub const PATIENT_SEX: Attribute =
    Attribute::text("PatientSex", Tag(0x0010, 0x0040), Level::Patient);

// Study
pub const STUDY_INSTANCE_UID: Attribute =
    Attribute::text("StudyInstanceUID", Tag(0x0020, 0x000D), Level::Study);
pub const STUDY_DATE: Attribute = Attribute::text("StudyDate", Tag(0x0008, 0x0020), Level::Study);
pub const STUDY_DESCRIPTION: Attribute =
    Attribute::text("StudyDescription", Tag(0x0008, 0x1030), Level::Study);
pub const STUDY_ID: Attribute = Attribute::text("StudyID", Tag(0x0020, 0x0010), Level::Study);

// Series
pub const SERIES_INSTANCE_UID: Attribute =
    Attribute::text("SeriesInstanceUID", Tag(0x0020, 0x000E), Level::Series);
pub const SERIES_DATE: Attribute =
    Attribute::text("SeriesDate", Tag(0x0008, 0x0021), Level::Series);
pub const MODALITY: Attribute = Attribute::text("Modality", Tag(0x0008, 0x0060), Level::Series);
pub const SERIES_DESCRIPTION: Attribute =
    Attribute::text("SeriesDescription", Tag(0x0008, 0x103E), Level::Series);
pub const SERIES_NUMBER: Attribute =
    Attribute::text("SeriesNumber", Tag(0x0020, 0x0011), Level::Series);
pub const FRAME_OF_REFERENCE_UID: Attribute =
    Attribute::text("FrameOfReferenceUID", Tag(0x0020, 0x0052), Level::Series);
pub const INSTANCE_NUMBER: Attribute =
    Attribute::text("InstanceNumber", Tag(0x0020, 0x0013), Level::Instance);

// References shared by several RT objects
pub const REFERENCED_SOP_CLASS_UID: Attribute =
    Attribute::text("ReferencedSOPClassUID", Tag(0x0008, 0x1150), Level::Instance);
pub const REFERENCED_SOP_INSTANCE_UID: Attribute =
    Attribute::text("ReferencedSOPInstanceUID", Tag(0x0008, 0x1155), Level::Instance);
pub const REFERENCED_SERIES_SEQUENCE: Attribute =
    Attribute::sequence("ReferencedSeriesSequence", Tag(0x0008, 0x1115));
pub const REFERENCED_RT_PLAN_SEQUENCE: Attribute =
    Attribute::sequence("ReferencedRTPlanSequence", Tag(0x300C, 0x0002));
pub const REFERENCED_STRUCTURE_SET_SEQUENCE: Attribute =
    Attribute::sequence("ReferencedStructureSetSequence", Tag(0x300C, 0x0060));

// CT Image
pub const SLICE_THICKNESS: Attribute =
    Attribute::text("SliceThickness", Tag(0x0018, 0x0050), Level::Series);
pub const KVP: Attribute = Attribute::text("KVP", Tag(0x0018, 0x0060), Level::Series);
pub const IMAGE_POSITION_PATIENT: Attribute =
    Attribute::text("ImagePositionPatient", Tag(0x0020, 0x0032), Level::Instance);
pub const ROWS: Attribute = Attribute::text("Rows", Tag(0x0028, 0x0010), Level::Series);
pub const COLUMNS: Attribute = Attribute::text("Columns", Tag(0x0028, 0x0011), Level::Series);
pub const PIXEL_SPACING: Attribute =
    Attribute::text("PixelSpacing", Tag(0x0028, 0x0030), Level::Series);

// RT Structure Set
pub const STRUCTURE_SET_LABEL: Attribute =
    Attribute::text("StructureSetLabel", Tag(0x3006, 0x0002), Level::Instance);
pub const STRUCTURE_SET_NAME: Attribute =
    Attribute::text("StructureSetName", Tag(0x3006, 0x0004), Level::Instance);
pub const STRUCTURE_SET_DATE: Attribute =
    Attribute::text("StructureSetDate", Tag(0x3006, 0x0008), Level::Instance);
pub const REFERENCED_FRAME_OF_REFERENCE_SEQUENCE: Attribute =
    Attribute::sequence("ReferencedFrameOfReferenceSequence", Tag(0x3006, 0x0010));
pub const RT_REFERENCED_STUDY_SEQUENCE: Attribute =
    Attribute::sequence("RTReferencedStudySequence", Tag(0x3006, 0x0012));
pub const RT_REFERENCED_SERIES_SEQUENCE: Attribute =
    Attribute::sequence("RTReferencedSeriesSequence", Tag(0x3006, 0x0014));
pub const CONTOUR_IMAGE_SEQUENCE: Attribute =
    Attribute::sequence("ContourImageSequence", Tag(0x3006, 0x0016));
pub const STRUCTURE_SET_ROI_SEQUENCE: Attribute =
    Attribute::sequence("StructureSetROISequence", Tag(0x3006, 0x0020));
pub const ROI_NUMBER: Attribute =
    Attribute::text("ROINumber", Tag(0x3006, 0x0022), Level::Instance);
pub const ROI_NAME: Attribute = Attribute::text("ROIName", Tag(0x3006, 0x0026), Level::Instance);

// RT Plan
pub const RT_PLAN_LABEL: Attribute =
    Attribute::text("RTPlanLabel", Tag(0x300A, 0x0002), Level::Instance);
pub const RT_PLAN_NAME: Attribute =
    Attribute::text("RTPlanName", Tag(0x300A, 0x0003), Level::Instance);
pub const RT_PLAN_DATE: Attribute =
    Attribute::text("RTPlanDate", Tag(0x300A, 0x0006), Level::Instance);
pub const RT_PLAN_GEOMETRY: Attribute =
    Attribute::text("RTPlanGeometry", Tag(0x300A, 0x000C), Level::Instance);
pub const FRACTION_GROUP_SEQUENCE: Attribute =
    Attribute::sequence("FractionGroupSequence", Tag(0x300A, 0x0070));
pub const NUMBER_OF_FRACTIONS_PLANNED: Attribute =
    Attribute::text("NumberOfFractionsPlanned", Tag(0x300A, 0x0078), Level::Instance);
pub const BEAM_SEQUENCE: Attribute = Attribute::sequence("BeamSequence", Tag(0x300A, 0x00B0));
pub const BEAM_NAME: Attribute = Attribute::text("BeamName", Tag(0x300A, 0x00C2), Level::Instance);

// RT Dose
pub const DOSE_UNITS: Attribute =
    Attribute::text("DoseUnits", Tag(0x3004, 0x0002), Level::Instance);
pub const DOSE_TYPE: Attribute = Attribute::text("DoseType", Tag(0x3004, 0x0004), Level::Instance);
pub const DOSE_COMMENT: Attribute =
    Attribute::text("DoseComment", Tag(0x3004, 0x0006), Level::Instance);
pub const DOSE_SUMMATION_TYPE: Attribute =
    Attribute::text("DoseSummationType", Tag(0x3004, 0x000A), Level::Instance);
pub const DOSE_GRID_SCALING: Attribute =
    Attribute::text("DoseGridScaling", Tag(0x3004, 0x000E), Level::Instance);

// RT Image
pub const RT_IMAGE_LABEL: Attribute =
    Attribute::text("RTImageLabel", Tag(0x3002, 0x0002), Level::Instance);
pub const RT_IMAGE_NAME: Attribute =
    Attribute::text("RTImageName", Tag(0x3002, 0x0003), Level::Instance);
pub const RT_IMAGE_DESCRIPTION: Attribute =
    Attribute::text("RTImageDescription", Tag(0x3002, 0x0004), Level::Instance);
pub const RT_IMAGE_PLANE: Attribute =
    Attribute::text("RTImagePlane", Tag(0x3002, 0x000C), Level::Instance);
pub const REFERENCED_BEAM_NUMBER: Attribute =
    Attribute::text("ReferencedBeamNumber", Tag(0x300C, 0x0006), Level::Instance);

/// Attributes extracted from every file regardless of modality
pub static COMMON: &[Attribute] = &[
    SOP_CLASS_UID,
    SOP_INSTANCE_UID,
    MANUFACTURER,
    PATIENT_NAME,
    PATIENT_ID,
    PATIENT_BIRTH_DATE,
    PATIENT_SEX,
    STUDY_INSTANCE_UID,
    STUDY_DATE,
    STUDY_DESCRIPTION,
    STUDY_ID,
    SERIES_INSTANCE_UID,
    SERIES_DATE,
    MODALITY,
    SERIES_DESCRIPTION,
    SERIES_NUMBER,
    FRAME_OF_REFERENCE_UID,
    INSTANCE_NUMBER,
];

pub static CT: &[Attribute] = &[
    SLICE_THICKNESS,
    KVP,
    IMAGE_POSITION_PATIENT,
    ROWS,
    COLUMNS,
    PIXEL_SPACING,
];

pub static RT_STRUCT: &[Attribute] = &[
    STRUCTURE_SET_LABEL,
    STRUCTURE_SET_NAME,
    STRUCTURE_SET_DATE,
    REFERENCED_FRAME_OF_REFERENCE_SEQUENCE,
    RT_REFERENCED_STUDY_SEQUENCE,
    RT_REFERENCED_SERIES_SEQUENCE,
    CONTOUR_IMAGE_SEQUENCE,
    REFERENCED_SOP_CLASS_UID,
    REFERENCED_SOP_INSTANCE_UID,
    REFERENCED_SERIES_SEQUENCE,
    STRUCTURE_SET_ROI_SEQUENCE,
    ROI_NUMBER,
    ROI_NAME,
];

pub static RT_PLAN: &[Attribute] = &[
    RT_PLAN_LABEL,
    RT_PLAN_NAME,
    RT_PLAN_DATE,
    RT_PLAN_GEOMETRY,
    REFERENCED_STRUCTURE_SET_SEQUENCE,
    REFERENCED_SOP_CLASS_UID,
    REFERENCED_SOP_INSTANCE_UID,
    FRACTION_GROUP_SEQUENCE,
    NUMBER_OF_FRACTIONS_PLANNED,
    BEAM_SEQUENCE,
    BEAM_NAME,
];

pub static RT_DOSE: &[Attribute] = &[
    DOSE_UNITS,
    DOSE_TYPE,
    DOSE_COMMENT,
    DOSE_SUMMATION_TYPE,
    DOSE_GRID_SCALING,
    REFERENCED_RT_PLAN_SEQUENCE,
    REFERENCED_SOP_CLASS_UID,
    REFERENCED_SOP_INSTANCE_UID,
];

pub static RT_IMAGE: &[Attribute] = &[
    RT_IMAGE_LABEL,
    RT_IMAGE_NAME,
    RT_IMAGE_DESCRIPTION,
    RT_IMAGE_PLANE,
    REFERENCED_RT_PLAN_SEQUENCE,
    REFERENCED_SOP_CLASS_UID,
    REFERENCED_SOP_INSTANCE_UID,
    REFERENCED_BEAM_NUMBER,
];

fn all() -> impl Iterator<Item = &'static Attribute> {
    COMMON
        .iter()
        .chain(CT)
        .chain(RT_STRUCT)
        .chain(RT_PLAN)
        .chain(RT_DOSE)
        .chain(RT_IMAGE)
}

/// Finds the attribute recognised for `tag` in files of the given modality
pub fn recognize(modality: Modality, tag: Tag) -> Option<&'static Attribute> {
    COMMON
        .iter()
        .chain(modality.resolver().attributes())
        .find(|attr| attr.tag == tag)
}

/// Looks up an attribute by its symbolic name
pub fn by_name(name: &str) -> Option<&'static Attribute> {
    all().find(|attr| attr.name == name)
}

/// Looks up an attribute by its code string (`x0020000d`, case-insensitive)
pub fn by_code(code: &str) -> Option<&'static Attribute> {
    all().find(|attr| attr.code().eq_ignore_ascii_case(code))
}

/// Looks up an attribute by tag
pub fn by_tag(tag: Tag) -> Option<&'static Attribute> {
    all().find(|attr| attr.tag == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(STUDY_INSTANCE_UID.code(), "x0020000d");
        assert_eq!(SERIES_INSTANCE_UID.code(), "x0020000e");
        assert_eq!(STRUCTURE_SET_LABEL.code(), "x30060002");
    }

    #[test]
    fn test_lookup_by_code_and_name() {
        assert_eq!(by_code("x0020000d"), Some(&STUDY_INSTANCE_UID));
        assert_eq!(by_code("X0020000D"), Some(&STUDY_INSTANCE_UID));
        assert_eq!(by_name("ReferencedRTPlanSequence"), Some(&REFERENCED_RT_PLAN_SEQUENCE));
        assert_eq!(by_tag(Tag(0x300C, 0x0060)), Some(&REFERENCED_STRUCTURE_SET_SEQUENCE));
        assert!(by_name("NoSuchAttribute").is_none());
    }

    #[test]
    fn test_recognize_is_modality_specific() {
        assert!(recognize(Modality::RtStruct, CONTOUR_IMAGE_SEQUENCE.tag).is_some());
        assert!(recognize(Modality::Ct, CONTOUR_IMAGE_SEQUENCE.tag).is_none());
        assert!(recognize(Modality::Other, SOP_INSTANCE_UID.tag).is_some());
        assert!(recognize(Modality::Ct, KVP.tag).is_some());
    }

    #[test]
    fn test_names_are_unique_per_tag() {
        for attr in all() {
            assert_eq!(by_name(attr.name).map(|a| a.tag), Some(attr.tag));
        }
    }

    #[test]
    fn test_shared_attributes() {
        assert!(PATIENT_SEX.is_shared());
        assert!(SLICE_THICKNESS.is_shared());
        assert!(!SOP_INSTANCE_UID.is_shared());
        assert!(!REFERENCED_RT_PLAN_SEQUENCE.is_shared());
    }
}
