use super::{Series, ValueSet};
use crate::error::{Result, RtLinkError};
use crate::parser::dictionary::{
    PATIENT_BIRTH_DATE, PATIENT_SEX, STUDY_DATE, STUDY_DESCRIPTION, STUDY_INSTANCE_UID,
};
use crate::parser::TagMap;
use crate::types::{Modality, Warning};
use std::collections::{BTreeSet, HashMap};

/// A study: series grouped under one StudyInstanceUID
///
/// Studies never merge; two studies with distinct UIDs stay distinct even
/// when they share a patient.
#[derive(Debug, Clone, Default)]
pub struct Study {
    study_instance_uid: Option<String>,

    /// Patient sex values seen across all instances
    pub patient_sex: ValueSet,

    /// Patient birth date values seen across all instances
    pub patient_birth_date: ValueSet,

    pub study_date: String,
    pub study_description: String,

    series: Vec<Series>,
    index: HashMap<String, usize>,

    pub warnings: Vec<Warning>,
}

impl Study {
    pub fn new(study_instance_uid: impl Into<String>) -> Self {
        Self {
            study_instance_uid: Some(study_instance_uid.into()),
            ..Default::default()
        }
    }

    /// # Errors
    ///
    /// [`RtLinkError::MissingIdentifier`] until an identifier is assigned
    pub fn study_instance_uid(&self) -> Result<&str> {
        self.study_instance_uid
            .as_deref()
            .ok_or(RtLinkError::MissingIdentifier(STUDY_INSTANCE_UID.name))
    }

    /// Study type: the modalities present, joined with `+`
    ///
    /// Modalities are listed in display order; unrecognised modalities use
    /// the code written in the files.
    pub fn study_type(&self) -> String {
        let mut known = BTreeSet::new();
        let mut other = BTreeSet::new();
        for series in &self.series {
            if series.modality == Modality::Other && !series.modality_code.is_empty() {
                other.insert(series.modality_code.as_str());
            } else {
                known.insert(series.modality);
            }
        }

        let mut codes: Vec<&str> = Vec::new();
        for modality in Modality::FLAT_ORDER {
            if known.contains(&modality) {
                codes.push(modality.code());
            }
        }
        codes.extend(other);
        codes.join("+")
    }

    /// Folds the patient and study level values of one instance
    pub fn observe(&mut self, tags: &TagMap) {
        if let Some(sex) = tags.text(&PATIENT_SEX) {
            self.patient_sex.insert(sex);
        }
        if let Some(birth_date) = tags.text(&PATIENT_BIRTH_DATE) {
            self.patient_birth_date.insert(birth_date);
        }
        if self.study_date.is_empty() {
            self.study_date = tags.text(&STUDY_DATE).unwrap_or_default().to_string();
        }
        if self.study_description.is_empty() {
            self.study_description = tags
                .text(&STUDY_DESCRIPTION)
                .unwrap_or_default()
                .to_string();
        }
    }

    /// Adds a series to the study
    ///
    /// # Errors
    ///
    /// Returns [`RtLinkError::MissingIdentifier`] if the series has no UID,
    /// or [`RtLinkError::DuplicateSeries`] if one with the same UID exists.
    pub fn add_series(&mut self, series: Series) -> Result<()> {
        let uid = series.series_instance_uid()?.to_string();
        if self.index.contains_key(&uid) {
            return Err(RtLinkError::DuplicateSeries(uid));
        }
        self.index.insert(uid, self.series.len());
        self.series.push(series);
        Ok(())
    }

    pub fn get_series(&self, series_instance_uid: &str) -> Option<&Series> {
        self.index
            .get(series_instance_uid)
            .map(|&idx| &self.series[idx])
    }

    pub fn get_series_mut(&mut self, series_instance_uid: &str) -> Option<&mut Series> {
        self.index
            .get(series_instance_uid)
            .map(|&idx| &mut self.series[idx])
    }

    /// Series in insertion order
    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn series_mut(&mut self) -> impl Iterator<Item = &mut Series> {
        self.series.iter_mut()
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Whether neither the study nor any of its series carries a blocking
    /// warning
    pub fn is_ready(&self) -> bool {
        self.warnings
            .iter()
            .chain(self.series.iter().flat_map(|s| s.warnings.iter()))
            .all(|w| !w.is_blocking())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(uid: &str, modality: Modality, code: &str) -> Series {
        Series::new(modality, code).with_identifiers(uid, "ST1")
    }

    #[test]
    fn test_duplicate_series() {
        let mut study = Study::new("ST1");
        study.add_series(series("CT1", Modality::Ct, "CT")).unwrap();
        let err = study
            .add_series(series("CT1", Modality::Ct, "CT"))
            .unwrap_err();
        assert!(matches!(err, RtLinkError::DuplicateSeries(ref uid) if uid == "CT1"));
        assert_eq!(study.series_count(), 1);
    }

    #[test]
    fn test_series_without_uid_is_rejected() {
        let mut study = Study::new("ST1");
        let err = study
            .add_series(Series::new(Modality::Ct, "CT"))
            .unwrap_err();
        assert!(matches!(err, RtLinkError::MissingIdentifier(_)));
    }

    #[test]
    fn test_study_type() {
        let mut study = Study::new("ST1");
        study.add_series(series("RP", Modality::RtPlan, "RTPLAN")).unwrap();
        study.add_series(series("CT1", Modality::Ct, "CT")).unwrap();
        study.add_series(series("CT2", Modality::Ct, "CT")).unwrap();
        study.add_series(series("MR1", Modality::Other, "MR")).unwrap();
        study.add_series(series("RS", Modality::RtStruct, "RTSTRUCT")).unwrap();

        assert_eq!(study.study_type(), "CT+RTSTRUCT+RTPLAN+MR");
    }

    #[test]
    fn test_readiness() {
        let mut study = Study::new("ST1");
        study.add_series(series("CT1", Modality::Ct, "CT")).unwrap();
        assert!(study.is_ready());

        study.warnings.push(Warning::ignorable("note", "fine"));
        assert!(study.is_ready());

        study
            .get_series_mut("CT1")
            .unwrap()
            .warnings
            .push(Warning::blocking("min-instances", "too few"));
        assert!(!study.is_ready());

        study.get_series_mut("CT1").unwrap().warnings[0].dismiss();
        assert!(study.is_ready());
    }
}
