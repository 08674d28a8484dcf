//! Modification ledger domain models.
//!
//! Every field-update request appends a ledger entry, whether it applied
//! immediately or went to the approval queue. Entries are resolved, never
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of a ledger entry.
///
/// `Pending` is the only non-terminal status; `AutoApplied` entries are
/// created already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModificationStatus {
    Pending,
    Approved,
    Rejected,
    AutoApplied,
}

impl ModificationStatus {
    /// Whether the entry can still be approved or rejected.
    pub fn is_resolvable(&self) -> bool {
        matches!(self, ModificationStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_resolvable()
    }
}

impl std::fmt::Display for ModificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModificationStatus::Pending => write!(f, "PENDING"),
            ModificationStatus::Approved => write!(f, "APPROVED"),
            ModificationStatus::Rejected => write!(f, "REJECTED"),
            ModificationStatus::AutoApplied => write!(f, "AUTO_APPLIED"),
        }
    }
}

/// Response for a single ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModificationResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Wire name of the edited field.
    pub field_name: String,
    /// Value before the change, as a display string.
    pub old_value: String,
    /// Proposed or applied value, as a display string.
    pub new_value: String,
    pub status: ModificationStatus,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response for the per-project ledger listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListModificationsResponse {
    pub modifications: Vec<ModificationResponse>,
}

/// Request body for approving or rejecting a pending entry.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ResolveModificationRequest {
    #[validate(length(max = 2000, message = "Notes must be 2000 characters or less"))]
    pub notes: Option<String>,
}

/// Response after resolving a pending entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolveModificationResponse {
    pub id: Uuid,
    pub status: ModificationStatus,
    pub approved_by: Uuid,
    pub approved_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Response for the stale-preferences cleanup operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CleanupResponse {
    pub cleaned_count: u64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ModificationStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&ModificationStatus::AutoApplied).unwrap(),
            "\"AUTO_APPLIED\""
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ModificationStatus::Pending.to_string(), "PENDING");
        assert_eq!(ModificationStatus::Approved.to_string(), "APPROVED");
        assert_eq!(ModificationStatus::Rejected.to_string(), "REJECTED");
        assert_eq!(ModificationStatus::AutoApplied.to_string(), "AUTO_APPLIED");
    }

    #[test]
    fn test_only_pending_is_resolvable() {
        assert!(ModificationStatus::Pending.is_resolvable());
        assert!(!ModificationStatus::Approved.is_resolvable());
        assert!(!ModificationStatus::Rejected.is_resolvable());
        assert!(!ModificationStatus::AutoApplied.is_resolvable());
    }

    #[test]
    fn test_terminal_is_complement_of_resolvable() {
        for status in [
            ModificationStatus::Pending,
            ModificationStatus::Approved,
            ModificationStatus::Rejected,
            ModificationStatus::AutoApplied,
        ] {
            assert_ne!(status.is_terminal(), status.is_resolvable());
        }
    }

    #[test]
    fn test_resolve_request_notes_length_validation() {
        let request = ResolveModificationRequest {
            notes: Some("x".repeat(2001)),
        };
        assert!(request.validate().is_err());

        let request = ResolveModificationRequest {
            notes: Some("too vague, please clarify".to_string()),
        };
        assert!(request.validate().is_ok());
    }
}
