/// Thresholds applied when validating an ingested batch
///
/// The values are supplied by the caller; nothing here is derived from the
/// files themselves.
///
/// # Example
///
/// ```
/// use rtlink_core::ValidationConfig;
///
/// let config = ValidationConfig::default()
///     .with_min_instance_count(20)
///     .require_image_series(true);
///
/// assert_eq!(config.min_instance_count, 20);
/// assert!(config.require_image_series);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationConfig {
    /// Minimum number of instances an image series (CT or other) must hold
    pub min_instance_count: usize,

    /// Warn when patient/study/series level values differ between instances
    pub warn_inconsistent_parameters: bool,

    /// Warn when a study or series UID is not a well-formed DICOM UID
    pub validate_uids: bool,

    /// Require every study to contain at least one CT series
    pub require_image_series: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_instance_count: 1,
            warn_inconsistent_parameters: true,
            validate_uids: true,
            require_image_series: false,
        }
    }
}

impl ValidationConfig {
    /// Creates a config that never produces warnings
    ///
    /// # Example
    ///
    /// ```
    /// use rtlink_core::ValidationConfig;
    ///
    /// let permissive = ValidationConfig::permissive();
    /// assert_eq!(permissive.min_instance_count, 0);
    /// assert!(!permissive.validate_uids);
    /// ```
    pub fn permissive() -> Self {
        Self {
            min_instance_count: 0,
            warn_inconsistent_parameters: false,
            validate_uids: false,
            require_image_series: false,
        }
    }

    /// Builder: Set the minimum instance count for image series
    pub fn with_min_instance_count(mut self, count: usize) -> Self {
        self.min_instance_count = count;
        self
    }

    /// Builder: Toggle inconsistent parameter warnings
    pub fn warn_inconsistent_parameters(mut self, warn: bool) -> Self {
        self.warn_inconsistent_parameters = warn;
        self
    }

    /// Builder: Toggle UID format checks
    pub fn validate_uids(mut self, validate: bool) -> Self {
        self.validate_uids = validate;
        self
    }

    /// Builder: Require a CT series in every study
    pub fn require_image_series(mut self, require: bool) -> Self {
        self.require_image_series = require;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = ValidationConfig::default();
        assert_eq!(config.min_instance_count, 1);
        assert!(config.warn_inconsistent_parameters);
        assert!(config.validate_uids);
        assert!(!config.require_image_series);
    }

    #[test]
    fn test_builder_chain() {
        let config = ValidationConfig::permissive()
            .with_min_instance_count(5)
            .warn_inconsistent_parameters(true)
            .validate_uids(true);

        assert_eq!(config.min_instance_count, 5);
        assert!(config.warn_inconsistent_parameters);
        assert!(config.validate_uids);
        assert!(!config.require_image_series);
    }
}
