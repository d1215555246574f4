//! Reference records extracted from sequence attributes
//!
//! Everything here is plain identifier strings; resolving them to series
//! happens in the tree builder.

use crate::parser::dictionary::{
    CONTOUR_IMAGE_SEQUENCE, FRAME_OF_REFERENCE_UID, REFERENCED_FRAME_OF_REFERENCE_SEQUENCE,
    REFERENCED_RT_PLAN_SEQUENCE, REFERENCED_SERIES_SEQUENCE, REFERENCED_SOP_CLASS_UID,
    REFERENCED_SOP_INSTANCE_UID, REFERENCED_STRUCTURE_SET_SEQUENCE, RT_REFERENCED_SERIES_SEQUENCE,
    RT_REFERENCED_STUDY_SEQUENCE, SERIES_INSTANCE_UID,
};
use crate::parser::TagMap;

/// (ReferencedSOPClassUID, ReferencedSOPInstanceUID) pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ReferenceRecord {
    pub sop_class_uid: Option<String>,
    pub sop_instance_uid: Option<String>,
}

impl ReferenceRecord {
    pub fn from_item(item: &TagMap) -> Self {
        Self {
            sop_class_uid: item.text(&REFERENCED_SOP_CLASS_UID).map(str::to_string),
            sop_instance_uid: item.text(&REFERENCED_SOP_INSTANCE_UID).map(str::to_string),
        }
    }

    fn from_items(items: &[TagMap]) -> Vec<Self> {
        items.iter().map(Self::from_item).collect()
    }
}

/// A referenced series, optionally narrowed to the images it names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct SeriesReference {
    pub series_instance_uid: Option<String>,
    pub contour_images: Vec<ReferenceRecord>,
}

impl SeriesReference {
    fn from_item(item: &TagMap) -> Self {
        Self {
            series_instance_uid: item.text(&SERIES_INSTANCE_UID).map(str::to_string),
            contour_images: ReferenceRecord::from_items(item.items(&CONTOUR_IMAGE_SEQUENCE)),
        }
    }
}

/// RT Referenced Study item: the study record plus its referenced series
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct StudyReference {
    pub study: ReferenceRecord,
    pub series: Vec<SeriesReference>,
}

/// Referenced Frame of Reference item of a structure set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct FrameOfReferenceReference {
    pub frame_of_reference_uid: Option<String>,
    pub studies: Vec<StudyReference>,
}

impl FrameOfReferenceReference {
    fn from_item(item: &TagMap) -> Self {
        let studies = item
            .items(&RT_REFERENCED_STUDY_SEQUENCE)
            .iter()
            .map(|study| StudyReference {
                study: ReferenceRecord::from_item(study),
                series: study
                    .items(&RT_REFERENCED_SERIES_SEQUENCE)
                    .iter()
                    .map(SeriesReference::from_item)
                    .collect(),
            })
            .collect();
        Self {
            frame_of_reference_uid: item.text(&FRAME_OF_REFERENCE_UID).map(str::to_string),
            studies,
        }
    }

    /// Referenced series at the bottom of the nested chain
    pub fn series(&self) -> impl Iterator<Item = &SeriesReference> {
        self.studies.iter().flat_map(|study| study.series.iter())
    }
}

/// The structured reference fields of an instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct References {
    pub rt_plans: Vec<ReferenceRecord>,
    pub structure_sets: Vec<ReferenceRecord>,
    pub frames_of_reference: Vec<FrameOfReferenceReference>,
    pub series: Vec<SeriesReference>,
}

impl References {
    /// Reads every known reference sequence present in `tags`
    pub fn from_tags(tags: &TagMap) -> Self {
        Self {
            rt_plans: ReferenceRecord::from_items(tags.items(&REFERENCED_RT_PLAN_SEQUENCE)),
            structure_sets: ReferenceRecord::from_items(
                tags.items(&REFERENCED_STRUCTURE_SET_SEQUENCE),
            ),
            frames_of_reference: tags
                .items(&REFERENCED_FRAME_OF_REFERENCE_SEQUENCE)
                .iter()
                .map(FrameOfReferenceReference::from_item)
                .collect(),
            series: tags
                .items(&REFERENCED_SERIES_SEQUENCE)
                .iter()
                .map(SeriesReference::from_item)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rt_plans.is_empty()
            && self.structure_sets.is_empty()
            && self.frames_of_reference.is_empty()
            && self.series.is_empty()
    }
}

/// A flattened pointer from one instance to another object
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ReferenceTarget {
    pub sop_class_uid: Option<String>,
    pub sop_instance_uid: Option<String>,
    pub series_instance_uid: Option<String>,
}

impl From<&ReferenceRecord> for ReferenceTarget {
    fn from(record: &ReferenceRecord) -> Self {
        Self {
            sop_class_uid: record.sop_class_uid.clone(),
            sop_instance_uid: record.sop_instance_uid.clone(),
            series_instance_uid: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TagValue;

    fn text_item(pairs: &[(&crate::parser::dictionary::Attribute, &str)]) -> TagMap {
        let mut map = TagMap::new();
        for (attr, value) in pairs {
            map.insert(attr, TagValue::Text(value.to_string()));
        }
        map
    }

    fn sequence(
        attr: &crate::parser::dictionary::Attribute,
        items: Vec<TagMap>,
        into: &mut TagMap,
    ) {
        into.insert(attr, TagValue::Sequence(items));
    }

    #[test]
    fn test_from_tags_rt_plan() {
        let mut tags = TagMap::new();
        sequence(
            &REFERENCED_RT_PLAN_SEQUENCE,
            vec![text_item(&[
                (&REFERENCED_SOP_CLASS_UID, "1.2.840.10008.5.1.4.1.1.481.5"),
                (&REFERENCED_SOP_INSTANCE_UID, "RP1"),
            ])],
            &mut tags,
        );

        let refs = References::from_tags(&tags);
        assert_eq!(refs.rt_plans.len(), 1);
        assert_eq!(refs.rt_plans[0].sop_instance_uid.as_deref(), Some("RP1"));
        assert!(refs.structure_sets.is_empty());
        assert!(!refs.is_empty());
    }

    #[test]
    fn test_frame_of_reference_chain() {
        let mut series_item = text_item(&[(&SERIES_INSTANCE_UID, "CT1")]);
        sequence(
            &CONTOUR_IMAGE_SEQUENCE,
            vec![text_item(&[(&REFERENCED_SOP_INSTANCE_UID, "CT1.1")])],
            &mut series_item,
        );
        let mut study_item = text_item(&[(&REFERENCED_SOP_INSTANCE_UID, "ST1")]);
        sequence(&RT_REFERENCED_SERIES_SEQUENCE, vec![series_item], &mut study_item);
        let mut frame_item = text_item(&[(&FRAME_OF_REFERENCE_UID, "FOR1")]);
        sequence(&RT_REFERENCED_STUDY_SEQUENCE, vec![study_item], &mut frame_item);
        let mut tags = TagMap::new();
        sequence(&REFERENCED_FRAME_OF_REFERENCE_SEQUENCE, vec![frame_item], &mut tags);

        let refs = References::from_tags(&tags);
        let frame = &refs.frames_of_reference[0];
        assert_eq!(frame.frame_of_reference_uid.as_deref(), Some("FOR1"));
        assert_eq!(frame.studies[0].study.sop_instance_uid.as_deref(), Some("ST1"));
        let series: Vec<_> = frame.series().collect();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].series_instance_uid.as_deref(), Some("CT1"));
        assert_eq!(series[0].contour_images[0].sop_instance_uid.as_deref(), Some("CT1.1"));
    }
}
