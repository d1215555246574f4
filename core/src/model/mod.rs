//! Instance → Series → Study aggregation
//!
//! Files are registered one at a time into a [`StudyDictionary`]. Every
//! level is keyed by its UID and rejects duplicates; lookups are O(1) and
//! iteration follows insertion order.

mod instance;
mod reference;
mod series;
mod study;
mod study_dictionary;
mod value_set;

pub use instance::Instance;
pub use reference::{
    FrameOfReferenceReference, ReferenceRecord, ReferenceTarget, References, SeriesReference,
    StudyReference,
};
pub use series::Series;
pub use study::Study;
pub use study_dictionary::StudyDictionary;
pub use value_set::ValueSet;
