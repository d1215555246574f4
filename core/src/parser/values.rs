use super::dictionary::{self, Attribute, AttributeKind};
use crate::types::Modality;
use dicom_core::header::Header;
use dicom_object::InMemDicomObject;
use std::collections::BTreeMap;

/// A parsed attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(untagged))]
pub enum TagValue {
    Text(String),
    Sequence(Vec<TagMap>),
}

/// Attribute name → value mapping for one file or one sequence item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct TagMap(BTreeMap<&'static str, TagValue>);

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, attr: &Attribute, value: TagValue) {
        self.0.insert(attr.name, value);
    }

    pub fn get(&self, attr: &Attribute) -> Option<&TagValue> {
        self.0.get(attr.name)
    }

    /// Text value of `attr`; empty strings count as absent
    pub fn text(&self, attr: &Attribute) -> Option<&str> {
        match self.0.get(attr.name) {
            Some(TagValue::Text(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Items of the sequence `attr`, empty when absent
    pub fn items(&self, attr: &Attribute) -> &[TagMap] {
        match self.0.get(attr.name) {
            Some(TagValue::Sequence(items)) => items,
            _ => &[],
        }
    }

    /// Top-level text entries
    pub fn texts(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().filter_map(|(name, value)| match value {
            TagValue::Text(s) => Some((*name, s.as_str())),
            TagValue::Sequence(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extracts every attribute recognised for `modality`, descending into
    /// sequences with the same dictionary
    pub fn extract(dcm: &InMemDicomObject, modality: Modality) -> Self {
        let mut map = TagMap::new();
        for elem in dcm.iter() {
            let Some(attr) = dictionary::recognize(modality, elem.tag()) else {
                continue;
            };
            match attr.kind {
                AttributeKind::Text => {
                    if let Ok(raw) = elem.to_str() {
                        map.insert(attr, TagValue::Text(clean_text(&raw)));
                    }
                }
                AttributeKind::Sequence => {
                    let items = elem
                        .items()
                        .map(|items| {
                            items
                                .iter()
                                .map(|item| TagMap::extract(item, modality))
                                .collect()
                        })
                        .unwrap_or_default();
                    map.insert(attr, TagValue::Sequence(items));
                }
            }
        }
        map
    }
}

/// Cuts a raw string at the first null byte and strips trailing padding
pub fn clean_text(raw: &str) -> String {
    let cut = raw.split('\0').next().unwrap_or_default();
    cut.trim_end().to_string()
}
