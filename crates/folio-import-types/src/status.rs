//! Outcome of a single save attempt

use serde::{Deserialize, Serialize};

/// Result of reconciling one row against the store
///
/// The numeric codes are stable and appear in serialized reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum SaveStatus {
    /// A new entity was written
    Created = 0,
    /// An existing entity was rewritten
    Updated = 1,
    /// The importer declined the row before any record existed
    Skipped = 2,
    /// Validation or the store rejected the row
    Failed = 3,
    /// The entity exists and nothing differs
    Noop = 4,
}

impl SaveStatus {
    /// All statuses in code order
    pub const ALL: [SaveStatus; 5] = [
        SaveStatus::Created,
        SaveStatus::Updated,
        SaveStatus::Skipped,
        SaveStatus::Failed,
        SaveStatus::Noop,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Fixed label used in rendered reports
    pub fn label(self) -> &'static str {
        match self {
            SaveStatus::Created => "CREATED",
            SaveStatus::Updated => "UPDATED",
            SaveStatus::Skipped => "SKIPPED",
            SaveStatus::Failed => "FAILED",
            SaveStatus::Noop => "NOOP",
        }
    }

    /// Whether the store was written
    pub fn is_write(self) -> bool {
        matches!(self, SaveStatus::Created | SaveStatus::Updated)
    }
}

impl std::fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(SaveStatus::Created.code(), 0);
        assert_eq!(SaveStatus::Updated.code(), 1);
        assert_eq!(SaveStatus::Skipped.code(), 2);
        assert_eq!(SaveStatus::Failed.code(), 3);
        assert_eq!(SaveStatus::Noop.code(), 4);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(SaveStatus::from_code(4), Some(SaveStatus::Noop));
        assert_eq!(SaveStatus::from_code(9), None);
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&SaveStatus::Noop).unwrap();
        assert_eq!(json, "\"NOOP\"");
        assert_eq!(SaveStatus::Failed.to_string(), "FAILED");
    }

    #[test]
    fn test_is_write() {
        assert!(SaveStatus::Created.is_write());
        assert!(SaveStatus::Updated.is_write());
        assert!(!SaveStatus::Noop.is_write());
        assert!(!SaveStatus::Skipped.is_write());
    }
}
