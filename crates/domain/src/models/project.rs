//! Project domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::UserBrief;

/// Full project representation returned to clients and admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub project_type: String,
    pub status: String,
    pub owner: UserBrief,
    pub event_date: Option<DateTime<Utc>>,
    pub title_video: Option<String>,
    pub city: Option<String>,
    pub civil_union_details: Option<String>,
    pub prep: Option<String>,
    pub church: Option<String>,
    pub session_notes: Option<String>,
    pub restaurant: Option<String>,
    pub details_extra: Option<String>,
    pub editing_preferences: Option<String>,
    pub admin_notified_of_changes: bool,
    pub has_unsent_changes: bool,
    pub last_client_notification_date: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a project. Provisions the client account if the email
/// is not yet registered.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Project name is required"))]
    pub project_name: String,
    pub event_date: DateTime<Utc>,
    #[validate(length(min = 1, max = 100, message = "Project type is required"))]
    pub project_type: String,
    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,
    #[validate(email(message = "A valid client email is required"))]
    pub client_email: String,
}

/// Response for project listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListProjectsResponse {
    pub projects: Vec<ProjectResponse>,
}

/// Request to update a single editable project field.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateFieldRequest {
    /// Wire name of the field, e.g. "city" or "editingPreferences".
    #[validate(length(min = 1, max = 64, message = "Field name is required"))]
    pub field: String,
    #[validate(length(max = 10000, message = "Value must be 10000 characters or less"))]
    pub value: String,
}

/// Outcome of a field update request.
///
/// `applied` is true when the change took effect immediately; false when it
/// was queued for admin approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateFieldResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectResponse>,
}

/// Archive-state action on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectAction {
    Archive,
    Unarchive,
}

/// Request body for archive/unarchive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectActionRequest {
    pub action: ProjectAction,
}

/// Generic acknowledgement response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_request_validation() {
        let request = CreateProjectRequest {
            project_name: "Ana & Mihai".to_string(),
            event_date: Utc::now(),
            project_type: "Wedding".to_string(),
            client_name: "Ana Pop".to_string(),
            client_email: "ana@example.com".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_project_request_rejects_bad_email() {
        let request = CreateProjectRequest {
            project_name: "Ana & Mihai".to_string(),
            event_date: Utc::now(),
            project_type: "Wedding".to_string(),
            client_name: "Ana Pop".to_string(),
            client_email: "not-an-email".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_field_request_rejects_oversized_value() {
        let request = UpdateFieldRequest {
            field: "prep".to_string(),
            value: "x".repeat(10001),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_project_action_deserialization() {
        let request: ProjectActionRequest =
            serde_json::from_str(r#"{"action": "archive"}"#).unwrap();
        assert_eq!(request.action, ProjectAction::Archive);

        let request: ProjectActionRequest =
            serde_json::from_str(r#"{"action": "unarchive"}"#).unwrap();
        assert_eq!(request.action, ProjectAction::Unarchive);

        assert!(serde_json::from_str::<ProjectActionRequest>(r#"{"action": "delete"}"#).is_err());
    }

    #[test]
    fn test_update_field_response_omits_empty_fields() {
        let response = UpdateFieldResponse {
            applied: false,
            message: Some("queued".to_string()),
            project: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("project").is_none());
        assert_eq!(json["applied"], false);
    }
}
