use super::node::{NodeData, ReferenceDetail, TreeNode};
use crate::error::Result;
use crate::model::{Instance, Series, Study};
use crate::types::Modality;
use std::collections::BTreeMap;

/// Builds the node shell for one series
///
/// Instances are ordered by SOPInstanceUID, so the node does not depend on
/// the order files were registered in. RT objects are keyed by their
/// smallest SOPInstanceUID, image series by their SeriesInstanceUID.
///
/// # Errors
///
/// Returns [`RtLinkError::MissingIdentifier`](crate::RtLinkError) if the
/// series or its study has no UID.
pub fn create_node(study: &Study, series: &Series) -> Result<TreeNode> {
    let resolver = series.modality.resolver();
    let series_uid = series.series_instance_uid()?;

    let mut instances: Vec<&Instance> = series.instances().collect();
    instances.sort_by(|a, b| a.sop_instance_uid().cmp(b.sop_instance_uid()));
    let first_sop = instances
        .first()
        .map(|i| i.sop_instance_uid())
        .unwrap_or_default();

    let key = if resolver.keyed_by_instance() {
        first_sop
    } else {
        series_uid
    };

    // Without a series description each instance is shown by its label
    let mut labels = BTreeMap::new();
    if series.series_description.is_empty() {
        if let Some(label) = resolver.label() {
            for instance in &instances {
                if let Some(text) = instance.tags.text(label) {
                    labels.insert(instance.sop_instance_uid().to_string(), text.to_string());
                }
            }
        }
    }
    let description = if series.series_description.is_empty() {
        labels
            .get(first_sop)
            .or_else(|| labels.values().next())
            .cloned()
            .unwrap_or_default()
    } else {
        series.series_description.clone()
    };
    let date = if series.series_date.is_empty() {
        study.study_date.clone()
    } else {
        series.series_date.clone()
    };

    let reference_details = instances
        .iter()
        .flat_map(|instance| {
            instance
                .reference_targets(series.modality)
                .into_iter()
                .map(move |referenced| ReferenceDetail {
                    sop_instance_uid: instance.sop_instance_uid().to_string(),
                    referenced,
                })
        })
        .collect();

    Ok(TreeNode {
        key: key.to_string(),
        modality: series.modality,
        data: NodeData {
            modality: if series.modality_code.is_empty() {
                series.modality.code().to_string()
            } else {
                series.modality_code.clone()
            },
            description,
            date,
            study_instance_uid: study.study_instance_uid()?.to_string(),
            series_instance_uid: series_uid.to_string(),
            sop_instance_uid: first_sop.to_string(),
            instance_count: series.instance_count(),
            parsable: series.modality != Modality::Other,
        },
        children: Vec::new(),
        parents: Vec::new(),
        sop_instance_uids: instances
            .iter()
            .map(|i| i.sop_instance_uid().to_string())
            .collect(),
        reference_details,
        labels,
        is_virtual: false,
        retired: false,
    })
}
