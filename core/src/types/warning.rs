use std::fmt;

/// A displayable validation finding attached to a study or series
///
/// Ignorable warnings are informational; a study carrying an undismissed
/// non-ignorable warning is not ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Warning {
    pub key: String,
    pub content: String,
    pub ignorable: bool,
    pub dismissed: bool,
}

impl Warning {
    /// Creates a warning that must be resolved
    pub fn blocking(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            ignorable: false,
            dismissed: false,
        }
    }

    /// Creates a warning the user may dismiss
    pub fn ignorable(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            ignorable: true,
            ..Self::blocking(key, content)
        }
    }

    /// Marks the warning as dismissed
    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }

    /// Whether this warning still prevents upload
    pub fn is_blocking(&self) -> bool {
        !self.ignorable && !self.dismissed
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.ignorable { "note" } else { "warning" };
        write!(f, "[{}] {}: {}", marker, self.key, self.content)?;
        if self.dismissed {
            write!(f, " (dismissed)")?;
        }
        Ok(())
    }
}

/// Replaces `current` with `fresh`, keeping the dismissed flag of warnings
/// whose key survives
pub fn merge_warnings(current: &mut Vec<Warning>, fresh: Vec<Warning>) {
    let merged = fresh
        .into_iter()
        .map(|mut warning| {
            if current
                .iter()
                .any(|old| old.key == warning.key && old.dismissed)
            {
                warning.dismissed = true;
            }
            warning
        })
        .collect();
    *current = merged;
}
