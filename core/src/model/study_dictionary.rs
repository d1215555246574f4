use super::{Instance, Series, Study};
use crate::error::{Result, RtLinkError};
use crate::parser::dictionary::{
    SERIES_DATE, SERIES_DESCRIPTION, SERIES_INSTANCE_UID, STUDY_INSTANCE_UID,
};
use crate::parser::ParsedFile;
use log::debug;
use std::collections::HashMap;

/// Every study of a batch, keyed by StudyInstanceUID
#[derive(Debug, Clone, Default)]
pub struct StudyDictionary {
    studies: Vec<Study>,
    index: HashMap<String, usize>,
}

impl StudyDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a study
    ///
    /// # Errors
    ///
    /// Returns [`RtLinkError::DuplicateStudy`] if a study with the same
    /// StudyInstanceUID is already present.
    pub fn add_study(&mut self, study: Study) -> Result<()> {
        let uid = study.study_instance_uid()?.to_string();
        if self.index.contains_key(&uid) {
            return Err(RtLinkError::DuplicateStudy(uid));
        }
        self.index.insert(uid, self.studies.len());
        self.studies.push(study);
        Ok(())
    }

    pub fn get_study(&self, study_instance_uid: &str) -> Option<&Study> {
        self.index
            .get(study_instance_uid)
            .map(|&idx| &self.studies[idx])
    }

    pub fn get_study_mut(&mut self, study_instance_uid: &str) -> Option<&mut Study> {
        self.index
            .get(study_instance_uid)
            .map(|&idx| &mut self.studies[idx])
    }

    pub fn get_series(
        &self,
        study_instance_uid: &str,
        series_instance_uid: &str,
    ) -> Option<&Series> {
        self.get_study(study_instance_uid)?
            .get_series(series_instance_uid)
    }

    /// Studies in insertion order
    pub fn studies(&self) -> impl Iterator<Item = &Study> {
        self.studies.iter()
    }

    pub fn studies_mut(&mut self) -> impl Iterator<Item = &mut Study> {
        self.studies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.studies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.studies.is_empty()
    }

    /// Total number of instances over every series
    pub fn instance_count(&self) -> usize {
        self.studies
            .iter()
            .flat_map(Study::series)
            .map(Series::instance_count)
            .sum()
    }

    /// Registers one parsed file
    ///
    /// Looks up or creates the study and series the file belongs to, then
    /// adds the instance. Nothing is modified when an error is returned.
    ///
    /// # Arguments
    ///
    /// * `file_name` - Display name of the source file
    /// * `parsed` - Tags extracted by the parser
    ///
    /// # Errors
    ///
    /// * [`RtLinkError::MissingIdentifier`] if the study, series or
    ///   instance UID is absent
    /// * [`RtLinkError::DuplicateInstance`] if the instance is already
    ///   registered in its series
    pub fn register(&mut self, file_name: &str, parsed: ParsedFile) -> Result<()> {
        let study_uid = parsed
            .study_instance_uid()
            .ok_or(RtLinkError::MissingIdentifier(STUDY_INSTANCE_UID.name))?
            .to_string();
        let series_uid = parsed
            .series_instance_uid()
            .ok_or(RtLinkError::MissingIdentifier(SERIES_INSTANCE_UID.name))?
            .to_string();

        let ParsedFile {
            modality,
            modality_code,
            tags,
        } = parsed;
        let instance = Instance::new(file_name, tags)?;

        if let Some(series) = self.get_series(&study_uid, &series_uid) {
            if series.contains_instance(instance.sop_instance_uid()) {
                return Err(RtLinkError::DuplicateInstance(
                    instance.sop_instance_uid().to_string(),
                ));
            }
        }

        if self.get_study(&study_uid).is_none() {
            debug!("New study {}", study_uid);
            self.add_study(Study::new(&study_uid))?;
        }
        let study = self
            .get_study_mut(&study_uid)
            .ok_or_else(|| RtLinkError::NotFound(study_uid.clone()))?;
        study.observe(&instance.tags);

        if study.get_series(&series_uid).is_none() {
            debug!("New {} series {}", modality, series_uid);
            let mut series =
                Series::new(modality, modality_code).with_identifiers(&series_uid, &study_uid);
            series.series_date = instance.tags.text(&SERIES_DATE).unwrap_or_default().to_string();
            series.series_description = instance
                .tags
                .text(&SERIES_DESCRIPTION)
                .unwrap_or_default()
                .to_string();
            study.add_series(series)?;
        }
        study
            .get_series_mut(&series_uid)
            .ok_or(RtLinkError::NotFound(series_uid))?
            .add_instance(instance)
    }

    /// Dismisses a warning on a study, or on one of its series
    ///
    /// # Errors
    ///
    /// [`RtLinkError::NotFound`] if the study, series or warning key is
    /// unknown
    pub fn dismiss_warning(
        &mut self,
        study_instance_uid: &str,
        series_instance_uid: Option<&str>,
        key: &str,
    ) -> Result<()> {
        let study = self
            .get_study_mut(study_instance_uid)
            .ok_or_else(|| RtLinkError::NotFound(study_instance_uid.to_string()))?;
        let warnings = match series_instance_uid {
            Some(uid) => {
                &mut study
                    .get_series_mut(uid)
                    .ok_or_else(|| RtLinkError::NotFound(uid.to_string()))?
                    .warnings
            }
            None => &mut study.warnings,
        };
        let warning = warnings
            .iter_mut()
            .find(|w| w.key == key)
            .ok_or_else(|| RtLinkError::NotFound(key.to_string()))?;
        warning.dismiss();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::dictionary::{MODALITY, SOP_INSTANCE_UID};
    use crate::parser::{TagMap, TagValue};
    use crate::types::{Modality, Warning};

    fn parsed(study: &str, series: &str, sop: &str) -> ParsedFile {
        let mut tags = TagMap::new();
        for (attr, value) in [
            (&STUDY_INSTANCE_UID, study),
            (&SERIES_INSTANCE_UID, series),
            (&SOP_INSTANCE_UID, sop),
            (&MODALITY, "CT"),
            (&SERIES_DESCRIPTION, "Planning CT"),
        ] {
            if !value.is_empty() {
                tags.insert(attr, TagValue::Text(value.to_string()));
            }
        }
        ParsedFile {
            modality: Modality::Ct,
            modality_code: "CT".to_string(),
            tags,
        }
    }

    #[test]
    fn test_register_groups_by_uid() {
        let mut dict = StudyDictionary::new();
        dict.register("a", parsed("ST1", "CT1", "CT1.1")).unwrap();
        dict.register("b", parsed("ST1", "CT1", "CT1.2")).unwrap();
        dict.register("c", parsed("ST1", "CT2", "CT2.1")).unwrap();
        dict.register("d", parsed("ST2", "CT3", "CT3.1")).unwrap();

        assert_eq!(dict.len(), 2);
        assert_eq!(dict.instance_count(), 4);
        let series = dict.get_series("ST1", "CT1").unwrap();
        assert_eq!(series.instance_count(), 2);
        assert_eq!(series.series_description, "Planning CT");
        assert_eq!(series.study_instance_uid().unwrap(), "ST1");
        let order: Vec<_> = dict
            .studies()
            .map(|s| s.study_instance_uid().unwrap())
            .collect();
        assert_eq!(order, vec!["ST1", "ST2"]);
    }

    #[test]
    fn test_register_duplicate_instance() {
        let mut dict = StudyDictionary::new();
        dict.register("a", parsed("ST1", "CT1", "CT1.1")).unwrap();
        let err = dict.register("copy of a", parsed("ST1", "CT1", "CT1.1")).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate instance CT1.1");
        assert_eq!(dict.instance_count(), 1);
    }

    #[test]
    fn test_register_missing_identifiers() {
        let mut dict = StudyDictionary::new();
        let err = dict.register("a", parsed("", "CT1", "CT1.1")).unwrap_err();
        assert!(matches!(err, RtLinkError::MissingIdentifier("StudyInstanceUID")));
        let err = dict.register("a", parsed("ST1", "", "CT1.1")).unwrap_err();
        assert!(matches!(err, RtLinkError::MissingIdentifier("SeriesInstanceUID")));
        let err = dict.register("a", parsed("ST1", "CT1", "")).unwrap_err();
        assert!(matches!(err, RtLinkError::MissingIdentifier("SOPInstanceUID")));
        assert!(dict.is_empty());
    }

    #[test]
    fn test_duplicate_study_detected() {
        let mut dict = StudyDictionary::new();
        dict.add_study(Study::new("ST1")).unwrap();
        let err = dict.add_study(Study::new("ST1")).unwrap_err();
        assert!(matches!(err, RtLinkError::DuplicateStudy(ref uid) if uid == "ST1"));
        assert!(dict.add_study(Study::default()).is_err());
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_dismiss_warning() {
        let mut dict = StudyDictionary::new();
        dict.register("a", parsed("ST1", "CT1", "CT1.1")).unwrap();
        dict.get_study_mut("ST1")
            .unwrap()
            .get_series_mut("CT1")
            .unwrap()
            .warnings
            .push(Warning::blocking("min-instances", "too few"));
        assert!(!dict.get_study("ST1").unwrap().is_ready());

        dict.dismiss_warning("ST1", Some("CT1"), "min-instances").unwrap();
        assert!(dict.get_study("ST1").unwrap().is_ready());

        assert!(dict.dismiss_warning("ST1", None, "min-instances").is_err());
        assert!(dict.dismiss_warning("ST9", None, "x").is_err());
    }
}
