use std::fmt;

/// Distinct values observed for one attribute, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ValueSet(Vec<String>);

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value; returns `true` if it was not seen before
    pub fn insert(&mut self, value: &str) -> bool {
        if self.0.iter().any(|v| v == value) {
            return false;
        }
        self.0.push(value.to_string());
        true
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// More than one distinct value was observed
    pub fn is_inconsistent(&self) -> bool {
        self.0.len() > 1
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_distinct() {
        let mut set = ValueSet::new();
        assert!(set.insert("M"));
        assert!(!set.insert("M"));
        assert!(!set.is_inconsistent());
        assert!(set.insert("F"));
        assert!(set.is_inconsistent());
        assert_eq!(set.first(), Some("M"));
        assert_eq!(set.to_string(), "M | F");
    }
}
