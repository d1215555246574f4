//! Batch validation
//!
//! Applies a [`ValidationConfig`] to every study and series of a batch and
//! attaches the resulting [`Warning`]s. Re-running validation replaces the
//! warnings but keeps the dismissed state of those that persist.

use crate::model::{Series, Study, StudyDictionary};
use crate::types::{merge_warnings, Modality, ValidationConfig, Warning};
use log::info;
use regex::Regex;
use std::sync::OnceLock;

pub const MIN_INSTANCES: &str = "min-instances";
pub const INCONSISTENT_PARAMETERS: &str = "inconsistent-parameters";
pub const INCONSISTENT_PATIENT_SEX: &str = "inconsistent-patient-sex";
pub const INCONSISTENT_BIRTH_DATE: &str = "inconsistent-birth-date";
pub const INVALID_STUDY_UID: &str = "invalid-study-uid";
pub const INVALID_SERIES_UID: &str = "invalid-series-uid";
pub const MISSING_IMAGE_SERIES: &str = "missing-image-series";

/// Whether `uid` is a well-formed DICOM UID
pub fn is_valid_uid(uid: &str) -> bool {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = REGEX.get_or_init(|| {
        Regex::new(r"^(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))*$").expect("Failed to compile regex")
    });
    uid.len() <= 64 && regex.is_match(uid)
}

/// Validates every study and series of `studies`
///
/// Returns the number of blocking warnings.
pub fn validate(studies: &mut StudyDictionary, config: &ValidationConfig) -> usize {
    let mut blocking = 0;
    for study in studies.studies_mut() {
        for series in study.series_mut() {
            let fresh = series_warnings(series, config);
            merge_warnings(&mut series.warnings, fresh);
        }
        let fresh = study_warnings(study, config);
        merge_warnings(&mut study.warnings, fresh);

        blocking += study
            .warnings
            .iter()
            .chain(study.series().flat_map(|s| s.warnings.iter()))
            .filter(|w| w.is_blocking())
            .count();
    }
    info!("Validated {} studies, {} blocking warnings", studies.len(), blocking);
    blocking
}

fn series_warnings(series: &Series, config: &ValidationConfig) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if !series.modality.is_rt() && series.instance_count() < config.min_instance_count {
        warnings.push(Warning::blocking(
            MIN_INSTANCES,
            format!(
                "{} series has {} instances, at least {} required",
                series.modality_code,
                series.instance_count(),
                config.min_instance_count
            ),
        ));
    }

    if config.warn_inconsistent_parameters {
        let names: Vec<_> = series
            .inconsistent_parameters()
            .map(|(name, values)| format!("{} ({})", name, values))
            .collect();
        if !names.is_empty() {
            warnings.push(Warning::ignorable(
                INCONSISTENT_PARAMETERS,
                format!("Values differ between instances: {}", names.join(", ")),
            ));
        }
    }

    if config.validate_uids {
        if let Ok(uid) = series.series_instance_uid() {
            if !is_valid_uid(uid) {
                warnings.push(Warning::ignorable(
                    INVALID_SERIES_UID,
                    format!("SeriesInstanceUID {} is not a valid UID", uid),
                ));
            }
        }
    }

    warnings
}

fn study_warnings(study: &Study, config: &ValidationConfig) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if config.warn_inconsistent_parameters {
        if study.patient_sex.is_inconsistent() {
            warnings.push(Warning::ignorable(
                INCONSISTENT_PATIENT_SEX,
                format!("Patient sex differs between files: {}", study.patient_sex),
            ));
        }
        if study.patient_birth_date.is_inconsistent() {
            warnings.push(Warning::ignorable(
                INCONSISTENT_BIRTH_DATE,
                format!(
                    "Patient birth date differs between files: {}",
                    study.patient_birth_date
                ),
            ));
        }
    }

    if config.validate_uids {
        if let Ok(uid) = study.study_instance_uid() {
            if !is_valid_uid(uid) {
                warnings.push(Warning::ignorable(
                    INVALID_STUDY_UID,
                    format!("StudyInstanceUID {} is not a valid UID", uid),
                ));
            }
        }
    }

    if config.require_image_series && !study.series().any(|s| s.modality == Modality::Ct) {
        warnings.push(Warning::blocking(
            MISSING_IMAGE_SERIES,
            "Study contains no CT series",
        ));
    }

    warnings
}
