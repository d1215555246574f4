use super::{Instance, ValueSet};
use crate::error::{Result, RtLinkError};
use crate::parser::dictionary::{self, SERIES_INSTANCE_UID, STUDY_INSTANCE_UID};
use crate::types::{Modality, Warning};
use std::collections::{BTreeMap, HashMap};

/// A set of instances sharing one SeriesInstanceUID
#[derive(Debug, Clone, Default)]
pub struct Series {
    series_instance_uid: Option<String>,
    study_instance_uid: Option<String>,

    pub modality: Modality,

    /// Modality code as written in the files (`MR`, `PT`, ... for Other)
    pub modality_code: String,

    pub series_date: String,
    pub series_description: String,

    instances: Vec<Instance>,
    index: HashMap<String, usize>,

    /// Distinct values per shared attribute, across instances
    parameters: BTreeMap<&'static str, ValueSet>,

    pub warnings: Vec<Warning>,
}

impl Series {
    pub fn new(modality: Modality, modality_code: impl Into<String>) -> Self {
        Self {
            modality,
            modality_code: modality_code.into(),
            ..Default::default()
        }
    }

    /// Builder: Set the series and owning study identifiers
    pub fn with_identifiers(
        mut self,
        series_instance_uid: impl Into<String>,
        study_instance_uid: impl Into<String>,
    ) -> Self {
        self.series_instance_uid = Some(series_instance_uid.into());
        self.study_instance_uid = Some(study_instance_uid.into());
        self
    }

    /// # Errors
    ///
    /// [`RtLinkError::MissingIdentifier`] until an identifier is assigned
    pub fn series_instance_uid(&self) -> Result<&str> {
        self.series_instance_uid
            .as_deref()
            .ok_or(RtLinkError::MissingIdentifier(SERIES_INSTANCE_UID.name))
    }

    /// # Errors
    ///
    /// [`RtLinkError::MissingIdentifier`] until an identifier is assigned
    pub fn study_instance_uid(&self) -> Result<&str> {
        self.study_instance_uid
            .as_deref()
            .ok_or(RtLinkError::MissingIdentifier(STUDY_INSTANCE_UID.name))
    }

    /// Adds an instance to the series
    ///
    /// Shared attribute values of the instance are folded into the
    /// parameter sets.
    ///
    /// # Errors
    ///
    /// Returns [`RtLinkError::DuplicateInstance`] if an instance with the
    /// same SOPInstanceUID is already present; the series is left unchanged.
    pub fn add_instance(&mut self, instance: Instance) -> Result<()> {
        let uid = instance.sop_instance_uid();
        if self.index.contains_key(uid) {
            return Err(RtLinkError::DuplicateInstance(uid.to_string()));
        }

        for (name, value) in instance.tags.texts() {
            let Some(attr) = dictionary::by_name(name) else {
                continue;
            };
            if attr.is_shared() {
                self.parameters.entry(attr.name).or_default().insert(value);
            }
        }

        self.index.insert(uid.to_string(), self.instances.len());
        self.instances.push(instance);
        Ok(())
    }

    pub fn get_instance(&self, sop_instance_uid: &str) -> Option<&Instance> {
        self.index
            .get(sop_instance_uid)
            .map(|&idx| &self.instances[idx])
    }

    pub fn contains_instance(&self, sop_instance_uid: &str) -> bool {
        self.index.contains_key(sop_instance_uid)
    }

    /// Instances in insertion order
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn sop_instance_uids(&self) -> impl Iterator<Item = &str> {
        self.instances.iter().map(Instance::sop_instance_uid)
    }

    pub fn parameters(&self) -> &BTreeMap<&'static str, ValueSet> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ValueSet> {
        self.parameters.get(name)
    }

    /// Shared attributes for which instances disagree
    pub fn inconsistent_parameters(&self) -> impl Iterator<Item = (&'static str, &ValueSet)> {
        self.parameters
            .iter()
            .filter(|(_, values)| values.is_inconsistent())
            .map(|(name, values)| (*name, values))
    }
}
