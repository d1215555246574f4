//! Core type definitions shared across the crate
//!
//! - [`Modality`]: Closed set of series content types taking part in RT linking
//! - [`Warning`]: Validation finding attached to a study or series
//! - [`ValidationConfig`]: Caller-supplied thresholds for batch validation

mod config;
mod modality;
mod warning;

pub use config::ValidationConfig;
pub use modality::Modality;
pub use warning::{merge_warnings, Warning};
