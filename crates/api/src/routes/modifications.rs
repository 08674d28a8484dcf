//! Modification ledger and approval route handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use domain::models::modification::{
    ListModificationsResponse, ModificationResponse, ResolveModificationRequest,
    ResolveModificationResponse,
};
use domain::models::{EditableField, ModificationStatus};
use domain::services::update_policy::can_access_project;
use persistence::entities::{ModificationEntity, ModificationStatusDb};
use persistence::repositories::{ModificationRepository, ProjectRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::metrics::record_email_sent;
use crate::routes::projects::project_link;

/// Map a ledger row to its API representation.
fn modification_response(entity: ModificationEntity) -> ModificationResponse {
    ModificationResponse {
        id: entity.id,
        project_id: entity.project_id,
        field_name: entity.field_name,
        old_value: entity.old_value,
        new_value: entity.new_value,
        status: entity.status.into(),
        created_by: entity.created_by,
        approved_by: entity.approved_by,
        approved_at: entity.approved_at,
        notes: entity.notes,
        created_at: entity.created_at,
    }
}

/// List the full change history of a project, newest first.
///
/// GET /api/v1/projects/{project_id}/modifications
#[axum::debug_handler]
pub async fn list_modifications(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let project_repo = ProjectRepository::new(state.pool.clone());
    let modification_repo = ModificationRepository::new(state.pool.clone());

    let project = project_repo
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if !can_access_project(auth.role, auth.user_id, project.owner_user_id) {
        return Err(ApiError::Forbidden(
            "You do not have access to this project".to_string(),
        ));
    }

    let entities = modification_repo.list_for_project(project_id).await?;
    let modifications = entities.into_iter().map(modification_response).collect();

    Ok(Json(ListModificationsResponse { modifications }))
}

/// Approve a pending modification and apply it to the project.
///
/// POST /api/v1/modifications/{modification_id}/approve
#[axum::debug_handler]
pub async fn approve_modification(
    State(state): State<AppState>,
    Path(modification_id): Path<Uuid>,
    auth: AuthUser,
    Json(request): Json<ResolveModificationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;
    request.validate()?;

    let project_repo = ProjectRepository::new(state.pool.clone());
    let modification_repo = ModificationRepository::new(state.pool.clone());

    let existing = modification_repo
        .find_by_id(modification_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Modification not found".to_string()))?;

    let status: ModificationStatus = existing.status.into();
    if !status.is_resolvable() {
        return Err(ApiError::InvalidState(format!(
            "Modification already {}",
            status
        )));
    }

    let field = EditableField::from_wire_name(&existing.field_name)?;
    let value = field.parse_value(&existing.new_value)?;

    // The status flip and the project mutation commit together. The flip's
    // PENDING predicate decides races: the loser's UPDATE matches nothing
    // and the transaction is rolled back without touching the project.
    let mut tx = state.pool.begin().await?;

    let resolved = modification_repo
        .resolve(
            &mut *tx,
            modification_id,
            ModificationStatusDb::Approved,
            auth.user_id,
            request.notes.as_deref(),
        )
        .await?
        .ok_or_else(|| {
            ApiError::InvalidState("Modification already processed".to_string())
        })?;

    project_repo
        .update_field(&mut *tx, existing.project_id, field, &value)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    tx.commit().await?;

    info!(
        modification_id = %modification_id,
        project_id = %existing.project_id,
        field = %field,
        admin_id = %auth.user_id,
        "Approved modification"
    );

    rearm_admin_gate(&project_repo, &modification_repo, existing.project_id).await?;

    Ok(Json(ResolveModificationResponse {
        id: resolved.id,
        status: ModificationStatus::Approved,
        approved_by: auth.user_id,
        approved_at: resolved.approved_at.unwrap_or_else(chrono::Utc::now),
        notes: resolved.notes,
    }))
}

/// Reject a pending modification, leaving the project untouched.
///
/// If the admin left a reason, the project owner is emailed it.
///
/// POST /api/v1/modifications/{modification_id}/reject
#[axum::debug_handler]
pub async fn reject_modification(
    State(state): State<AppState>,
    Path(modification_id): Path<Uuid>,
    auth: AuthUser,
    Json(request): Json<ResolveModificationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;
    request.validate()?;

    let project_repo = ProjectRepository::new(state.pool.clone());
    let modification_repo = ModificationRepository::new(state.pool.clone());

    let existing = modification_repo
        .find_by_id(modification_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Modification not found".to_string()))?;

    let status: ModificationStatus = existing.status.into();
    if !status.is_resolvable() {
        return Err(ApiError::InvalidState(format!(
            "Modification already {}",
            status
        )));
    }

    let resolved = modification_repo
        .resolve(
            &state.pool,
            modification_id,
            ModificationStatusDb::Rejected,
            auth.user_id,
            request.notes.as_deref(),
        )
        .await?
        .ok_or_else(|| {
            ApiError::InvalidState("Modification already processed".to_string())
        })?;

    info!(
        modification_id = %modification_id,
        project_id = %existing.project_id,
        admin_id = %auth.user_id,
        "Rejected modification"
    );

    // Best-effort rejection notice; the rejection itself already committed.
    let reason = request.notes.as_deref().map(str::trim).unwrap_or("");
    if !reason.is_empty() {
        if let Some(entity) = project_repo.find_with_owner(existing.project_id).await? {
            if entity.owner_email.is_empty() {
                warn!(
                    project_id = %existing.project_id,
                    "Skipping rejection notice: owner has no email"
                );
            } else {
                let field_display = EditableField::from_wire_name(&existing.field_name)
                    .map(|f| f.display_name().to_string())
                    .unwrap_or_else(|_| existing.field_name.clone());

                let send_result = state
                    .email
                    .send_rejection_notice(
                        &entity.owner_email,
                        entity.owner_display_name.as_deref(),
                        &entity.project.name,
                        &field_display,
                        reason,
                        &project_link(&state, existing.project_id),
                    )
                    .await;

                match send_result {
                    Ok(()) => record_email_sent("rejection_notice", true),
                    Err(e) => {
                        record_email_sent("rejection_notice", false);
                        warn!(
                            project_id = %existing.project_id,
                            error = %e,
                            "Failed to send rejection notice"
                        );
                    }
                }
            }
        }
    }

    rearm_admin_gate(&project_repo, &modification_repo, existing.project_id).await?;

    Ok(Json(ResolveModificationResponse {
        id: resolved.id,
        status: ModificationStatus::Rejected,
        approved_by: auth.user_id,
        approved_at: resolved.approved_at.unwrap_or_else(chrono::Utc::now),
        notes: resolved.notes,
    }))
}

/// Clear the admin-notified flag once a project has no pending entries left,
/// so the next pending batch triggers a fresh alert email.
async fn rearm_admin_gate(
    project_repo: &ProjectRepository,
    modification_repo: &ModificationRepository,
    project_id: Uuid,
) -> Result<(), ApiError> {
    let remaining = modification_repo
        .count_pending_for_project(project_id)
        .await?;

    if remaining == 0 {
        project_repo.set_admin_notified(project_id, false).await?;
    }

    Ok(())
}
