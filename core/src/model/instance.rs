use super::{ReferenceTarget, References};
use crate::error::{Result, RtLinkError};
use crate::parser::dictionary::SOP_INSTANCE_UID;
use crate::parser::TagMap;
use crate::types::Modality;

/// One source file within a series
///
/// Immutable once created; the owning [`Series`](super::Series) keeps it
/// keyed by SOPInstanceUID.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    sop_instance_uid: String,

    /// Name of the file the instance was read from
    pub file_name: String,

    /// Every recognised attribute of the file
    pub tags: TagMap,

    /// Reference sequences extracted from `tags`
    pub references: References,
}

impl Instance {
    /// Creates an instance from the parsed tags of one file
    ///
    /// # Errors
    ///
    /// Returns [`RtLinkError::MissingIdentifier`] if the file carries no
    /// SOPInstanceUID.
    pub fn new(file_name: impl Into<String>, tags: TagMap) -> Result<Self> {
        let sop_instance_uid = tags
            .text(&SOP_INSTANCE_UID)
            .ok_or(RtLinkError::MissingIdentifier(SOP_INSTANCE_UID.name))?
            .to_string();
        let references = References::from_tags(&tags);

        Ok(Self {
            sop_instance_uid,
            file_name: file_name.into(),
            tags,
            references,
        })
    }

    pub fn sop_instance_uid(&self) -> &str {
        &self.sop_instance_uid
    }

    /// Flattened reference targets, interpreted for `modality`
    pub fn reference_targets(&self, modality: Modality) -> Vec<ReferenceTarget> {
        modality.resolver().targets(&self.references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TagValue;

    #[test]
    fn test_missing_sop_instance_uid() {
        let err = Instance::new("a.dcm", TagMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing identifier: SOPInstanceUID");
    }

    #[test]
    fn test_new() {
        let mut tags = TagMap::new();
        tags.insert(&SOP_INSTANCE_UID, TagValue::Text("1.2.3".to_string()));
        let instance = Instance::new("a.dcm", tags).unwrap();
        assert_eq!(instance.sop_instance_uid(), "1.2.3");
        assert_eq!(instance.file_name, "a.dcm");
        assert!(instance.references.is_empty());
        assert!(instance.reference_targets(Modality::RtPlan).is_empty());
    }
}
