//! Field update policy.
//!
//! Decides, per update request, whether a change applies to the project
//! immediately or is queued as a pending modification for admin review. The
//! decision is pure; persistence and notification side effects live in the
//! API layer.

use uuid::Uuid;

use crate::models::{EditableField, Role};

/// How a field update request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDisposition {
    /// Applied to the project immediately; ledger entry is AUTO_APPLIED.
    AutoApply,
    /// Recorded as PENDING; the project is untouched until an admin approves.
    RequiresApproval,
}

/// Message returned to clients whose change was queued for approval.
pub const PENDING_APPROVAL_MESSAGE: &str =
    "Your change was sent to the videographer for approval.";

/// Classify an update request by actor role and target field.
///
/// Admins apply everything directly. Editing preferences apply directly for
/// every role. Any other client edit goes through approval.
pub fn classify_update(role: Role, field: EditableField) -> UpdateDisposition {
    if role.is_admin() || field.always_auto_applies() {
        UpdateDisposition::AutoApply
    } else {
        UpdateDisposition::RequiresApproval
    }
}

/// Whether the actor may view or edit the project at all.
///
/// Admins act on every project; clients only on their own.
pub fn can_access_project(role: Role, actor_id: Uuid, owner_id: Uuid) -> bool {
    role.is_admin() || actor_id == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_auto_applies_every_field() {
        for field in EditableField::ALL {
            assert_eq!(
                classify_update(Role::Admin, field),
                UpdateDisposition::AutoApply
            );
        }
    }

    #[test]
    fn test_client_requires_approval_except_preferences() {
        for field in EditableField::ALL {
            let expected = if field.always_auto_applies() {
                UpdateDisposition::AutoApply
            } else {
                UpdateDisposition::RequiresApproval
            };
            assert_eq!(classify_update(Role::Client, field), expected);
        }
    }

    #[test]
    fn test_client_preferences_auto_apply() {
        assert_eq!(
            classify_update(Role::Client, EditableField::EditingPreferences),
            UpdateDisposition::AutoApply
        );
    }

    #[test]
    fn test_admin_accesses_any_project() {
        let admin = Uuid::new_v4();
        let owner = Uuid::new_v4();
        assert!(can_access_project(Role::Admin, admin, owner));
    }

    #[test]
    fn test_client_accesses_only_own_project() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        assert!(can_access_project(Role::Client, owner, owner));
        assert!(!can_access_project(Role::Client, stranger, owner));
    }
}
