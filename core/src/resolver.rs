//! Per-modality reference handling
//!
//! Every [`Modality`] has one [`ReferenceResolver`]. It names the attributes
//! the parser extracts for the modality, the bucket its references point
//! into, and how those references are flattened into targets.

use crate::model::{ReferenceTarget, References};
use crate::parser::dictionary::{self, Attribute};
use crate::types::Modality;

pub trait ReferenceResolver: Sync {
    /// Modality-specific attributes, in addition to the common set
    fn attributes(&self) -> &'static [Attribute];

    /// Bucket this modality's references resolve into
    fn target(&self) -> Option<Modality>;

    /// Flattens the structured references of one instance
    fn targets(&self, references: &References) -> Vec<ReferenceTarget>;

    /// Whether nodes of this modality are looked up by SOPInstanceUID
    /// (RT objects) rather than SeriesInstanceUID (images)
    fn keyed_by_instance(&self) -> bool;

    /// Attribute used as description when the series has none
    fn label(&self) -> Option<&'static Attribute> {
        None
    }
}

pub struct CtResolver;

impl ReferenceResolver for CtResolver {
    fn attributes(&self) -> &'static [Attribute] {
        dictionary::CT
    }

    fn target(&self) -> Option<Modality> {
        None
    }

    fn targets(&self, _references: &References) -> Vec<ReferenceTarget> {
        Vec::new()
    }

    fn keyed_by_instance(&self) -> bool {
        false
    }
}

pub struct OtherResolver;

impl ReferenceResolver for OtherResolver {
    fn attributes(&self) -> &'static [Attribute] {
        &[]
    }

    fn target(&self) -> Option<Modality> {
        None
    }

    fn targets(&self, _references: &References) -> Vec<ReferenceTarget> {
        Vec::new()
    }

    fn keyed_by_instance(&self) -> bool {
        false
    }
}

/// Structure sets point at image series through the nested frame of
/// reference chain, or directly through ReferencedSeriesSequence
pub struct RtStructResolver;

impl ReferenceResolver for RtStructResolver {
    fn attributes(&self) -> &'static [Attribute] {
        dictionary::RT_STRUCT
    }

    fn target(&self) -> Option<Modality> {
        Some(Modality::Ct)
    }

    fn targets(&self, references: &References) -> Vec<ReferenceTarget> {
        let chained = references
            .frames_of_reference
            .iter()
            .flat_map(|frame| frame.series());
        let mut targets = Vec::new();
        for series in chained.chain(references.series.iter()) {
            if series.contour_images.is_empty() {
                targets.push(ReferenceTarget {
                    sop_class_uid: None,
                    sop_instance_uid: None,
                    series_instance_uid: series.series_instance_uid.clone(),
                });
                continue;
            }
            for image in &series.contour_images {
                targets.push(ReferenceTarget {
                    series_instance_uid: series.series_instance_uid.clone(),
                    ..ReferenceTarget::from(image)
                });
            }
        }
        targets
    }

    fn keyed_by_instance(&self) -> bool {
        true
    }

    fn label(&self) -> Option<&'static Attribute> {
        Some(&dictionary::STRUCTURE_SET_LABEL)
    }
}

pub struct RtPlanResolver;

impl ReferenceResolver for RtPlanResolver {
    fn attributes(&self) -> &'static [Attribute] {
        dictionary::RT_PLAN
    }

    fn target(&self) -> Option<Modality> {
        Some(Modality::RtStruct)
    }

    fn targets(&self, references: &References) -> Vec<ReferenceTarget> {
        references
            .structure_sets
            .iter()
            .map(ReferenceTarget::from)
            .collect()
    }

    fn keyed_by_instance(&self) -> bool {
        true
    }

    fn label(&self) -> Option<&'static Attribute> {
        Some(&dictionary::RT_PLAN_LABEL)
    }
}

pub struct RtDoseResolver;

impl ReferenceResolver for RtDoseResolver {
    fn attributes(&self) -> &'static [Attribute] {
        dictionary::RT_DOSE
    }

    fn target(&self) -> Option<Modality> {
        Some(Modality::RtPlan)
    }

    fn targets(&self, references: &References) -> Vec<ReferenceTarget> {
        references.rt_plans.iter().map(ReferenceTarget::from).collect()
    }

    fn keyed_by_instance(&self) -> bool {
        true
    }

    fn label(&self) -> Option<&'static Attribute> {
        Some(&dictionary::DOSE_COMMENT)
    }
}

pub struct RtImageResolver;

impl ReferenceResolver for RtImageResolver {
    fn attributes(&self) -> &'static [Attribute] {
        dictionary::RT_IMAGE
    }

    fn target(&self) -> Option<Modality> {
        Some(Modality::RtPlan)
    }

    fn targets(&self, references: &References) -> Vec<ReferenceTarget> {
        references.rt_plans.iter().map(ReferenceTarget::from).collect()
    }

    fn keyed_by_instance(&self) -> bool {
        true
    }

    fn label(&self) -> Option<&'static Attribute> {
        Some(&dictionary::RT_IMAGE_LABEL)
    }
}
