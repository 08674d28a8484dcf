//! Client-notification gate route handlers.
//!
//! Tracks admin-made changes the client has not been told about yet and
//! turns them into a single digest email on demand.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use domain::models::project::AckResponse;
use domain::models::EditableField;
use persistence::repositories::{ModificationRepository, ProjectRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::metrics::record_email_sent;
use crate::routes::projects::project_link;

/// Email the project owner a digest of auto-applied changes since their
/// last notification, then clear the unsent-changes flag.
///
/// The flag is only cleared after a successful send, so a failed send is
/// retried by a later request.
///
/// POST /api/v1/projects/{project_id}/notify-client
#[axum::debug_handler]
pub async fn notify_client(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let project_repo = ProjectRepository::new(state.pool.clone());
    let modification_repo = ModificationRepository::new(state.pool.clone());

    let entity = project_repo
        .find_with_owner(project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if entity.owner_email.is_empty() {
        return Err(ApiError::MissingEmail);
    }

    if !entity.project.has_unsent_changes {
        return Err(ApiError::NoChangesToNotify);
    }

    let since = entity
        .project
        .last_client_notification_date
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let changes = modification_repo
        .list_auto_applied_since(project_id, since)
        .await?;

    let change_lines: Vec<String> = changes
        .iter()
        .map(|change| {
            let display = EditableField::from_wire_name(&change.field_name)
                .map(|f| f.display_name().to_string())
                .unwrap_or_else(|_| change.field_name.clone());
            format!("- {}: {}", display, change.new_value)
        })
        .collect();

    let send_result = state
        .email
        .send_project_digest(
            &entity.owner_email,
            entity.owner_display_name.as_deref(),
            &entity.project.name,
            &change_lines,
            &project_link(&state, project_id),
        )
        .await;

    if let Err(e) = send_result {
        record_email_sent("client_digest", false);
        warn!(
            project_id = %project_id,
            error = %e,
            "Failed to send client digest; flag left set for retry"
        );
        return Err(ApiError::Internal(
            "Failed to send notification email".to_string(),
        ));
    }

    record_email_sent("client_digest", true);
    project_repo.mark_digest_sent(project_id).await?;

    info!(
        project_id = %project_id,
        admin_id = %auth.user_id,
        change_count = change_lines.len(),
        "Sent client digest"
    );

    Ok(Json(AckResponse {
        success: true,
        message: "Notification sent successfully".to_string(),
    }))
}

/// Dismiss the unsent-changes flag without emailing anyone.
///
/// POST /api/v1/projects/{project_id}/clear-notifications
#[axum::debug_handler]
pub async fn clear_notifications(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let project_repo = ProjectRepository::new(state.pool.clone());

    project_repo
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    project_repo
        .set_has_unsent_changes(&state.pool, project_id, false)
        .await?;

    info!(
        project_id = %project_id,
        admin_id = %auth.user_id,
        "Cleared unsent-changes flag without notifying"
    );

    Ok(Json(AckResponse {
        success: true,
        message: "Notifications cleared successfully".to_string(),
    }))
}
