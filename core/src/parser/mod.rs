//! Tag parser
//!
//! Turns the raw bytes of one file into a [`ParsedFile`]: the modality and
//! a [`TagMap`] of every attribute the modality's dictionary recognises.
//! Directory index files are signalled rather than parsed.

pub mod dictionary;
pub mod guard;
mod values;

pub use values::{clean_text, TagMap, TagValue};

use crate::error::ParseFailure;
use crate::types::Modality;
use dicom_dictionary_std::uids;
use dicom_object::InMemDicomObject;
use dictionary::{
    MODALITY, SERIES_INSTANCE_UID, SOP_CLASS_UID, SOP_INSTANCE_UID, STUDY_INSTANCE_UID,
};

/// SOP classes of files that index other files instead of holding data
pub const DIRECTORY_SOP_CLASSES: &[&str] = &[uids::MEDIA_STORAGE_DIRECTORY_STORAGE];

/// Result of parsing one file
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A regular file to aggregate
    File(ParsedFile),
    /// A directory index (DICOMDIR); never registered
    DirectoryIndex,
}

/// Structured record extracted from one file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub modality: Modality,
    /// Modality code as written in the file
    pub modality_code: String,
    pub tags: TagMap,
}

impl ParsedFile {
    pub fn sop_instance_uid(&self) -> Option<&str> {
        self.tags.text(&SOP_INSTANCE_UID)
    }

    pub fn series_instance_uid(&self) -> Option<&str> {
        self.tags.text(&SERIES_INSTANCE_UID)
    }

    pub fn study_instance_uid(&self) -> Option<&str> {
        self.tags.text(&STUDY_INSTANCE_UID)
    }

    pub fn sop_class_uid(&self) -> Option<&str> {
        self.tags.text(&SOP_CLASS_UID)
    }
}

/// Parses the raw bytes of one file
///
/// # Errors
///
/// Returns a [`ParseFailure`] if the bytes are not a DICOM Part 10 stream,
/// if any element header is inconsistent with the buffer, or if the
/// decoder rejects the content.
pub fn parse_bytes(bytes: &[u8]) -> Result<ParseOutcome, ParseFailure> {
    let stream = guard::strip_preamble(bytes)?;
    guard::check(stream)?;

    let file = dicom_object::from_reader(stream)?;

    let media_class = clean_text(&file.meta().media_storage_sop_class_uid);
    if is_directory_class(&media_class) {
        return Ok(ParseOutcome::DirectoryIndex);
    }

    let dcm: &InMemDicomObject = &file;
    Ok(ParseOutcome::File(parse_object(dcm)))
}

/// Extracts a [`ParsedFile`] from an already decoded object
pub fn parse_object(dcm: &InMemDicomObject) -> ParsedFile {
    let modality_code = dcm
        .element(MODALITY.tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| clean_text(&s))
        .unwrap_or_default();
    let modality = Modality::from_code(&modality_code);

    ParsedFile {
        modality,
        modality_code,
        tags: TagMap::extract(dcm, modality),
    }
}

fn is_directory_class(sop_class: &str) -> bool {
    DIRECTORY_SOP_CLASSES.contains(&sop_class)
}
