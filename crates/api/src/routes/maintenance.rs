//! Administrative maintenance route handlers.

use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use domain::models::modification::CleanupResponse;
use domain::models::EditableField;
use persistence::repositories::ModificationRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Note attached to entries rejected by the cleanup pass.
const CLEANUP_NOTE: &str =
    "System cleanup: this field auto-applies and should never have been queued as pending.";

/// Reject stale PENDING entries for the editing-preferences field.
///
/// Preferences auto-apply for every role, so a pending preferences entry can
/// only come from legacy data or a race. The pass is idempotent: a second
/// run finds nothing.
///
/// POST /api/v1/maintenance/cleanup-preferences
#[axum::debug_handler]
pub async fn cleanup_stale_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let modification_repo = ModificationRepository::new(state.pool.clone());

    let cleaned_count = modification_repo
        .reject_stale_preferences(EditableField::EditingPreferences.wire_name(), CLEANUP_NOTE)
        .await?;

    info!(
        admin_id = %auth.user_id,
        cleaned_count = cleaned_count,
        "Ran stale-preferences cleanup"
    );

    Ok(Json(CleanupResponse {
        cleaned_count,
        message: "Cleanup successful.".to_string(),
    }))
}
