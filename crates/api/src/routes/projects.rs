//! Project management and field update route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use domain::models::project::{
    AckResponse, CreateProjectRequest, ListProjectsResponse, ProjectAction, ProjectActionRequest,
    ProjectResponse, UpdateFieldRequest, UpdateFieldResponse,
};
use domain::models::user::UserBrief;
use domain::models::EditableField;
use domain::services::update_policy::{
    can_access_project, classify_update, UpdateDisposition, PENDING_APPROVAL_MESSAGE,
};
use persistence::entities::{ProjectWithOwnerEntity, RoleDb};
use persistence::repositories::{
    CreateProjectInput, CreateUserInput, ModificationRepository, ProjectRepository, UserRepository,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::metrics::record_email_sent;

/// Map a joined project row to its API representation.
pub(crate) fn project_response(entity: ProjectWithOwnerEntity) -> ProjectResponse {
    let p = entity.project;
    ProjectResponse {
        id: p.id,
        name: p.name,
        project_type: p.project_type,
        status: p.status,
        owner: UserBrief {
            id: p.owner_user_id,
            email: entity.owner_email,
            display_name: entity.owner_display_name,
        },
        event_date: p.event_date,
        title_video: p.title_video,
        city: p.city,
        civil_union_details: p.civil_union_details,
        prep: p.prep,
        church: p.church,
        session_notes: p.session_notes,
        restaurant: p.restaurant,
        details_extra: p.details_extra,
        editing_preferences: p.editing_preferences,
        admin_notified_of_changes: p.admin_notified_of_changes,
        has_unsent_changes: p.has_unsent_changes,
        last_client_notification_date: p.last_client_notification_date,
        is_archived: p.is_archived,
        created_at: p.created_at,
        updated_at: p.updated_at,
    }
}

/// Dashboard link for a project, embedded in notification emails.
pub(crate) fn project_link(state: &AppState, project_id: Uuid) -> String {
    format!(
        "{}/dashboard/projects/{}",
        state.config.email.base_url, project_id
    )
}

/// Create a project, provisioning the client account if the email is new.
///
/// POST /api/v1/projects
#[axum::debug_handler]
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;
    request.validate()?;

    let user_repo = UserRepository::new(state.pool.clone());
    let project_repo = ProjectRepository::new(state.pool.clone());

    let client = match user_repo.find_by_email(&request.client_email).await? {
        Some(existing) => existing,
        None => {
            let temporary = shared::password::generate_temporary_password();
            let password_hash = shared::password::hash_password(&temporary)
                .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

            user_repo
                .create(CreateUserInput {
                    email: request.client_email.clone(),
                    display_name: Some(request.client_name.clone()),
                    password_hash,
                    role: RoleDb::Client,
                })
                .await?
        }
    };

    let project = project_repo
        .create(CreateProjectInput {
            owner_user_id: client.id,
            name: request.project_name.clone(),
            project_type: request.project_type.clone(),
            status: "Planning".to_string(),
            event_date: request.event_date,
        })
        .await?;

    info!(
        project_id = %project.id,
        owner_id = %client.id,
        admin_id = %auth.user_id,
        "Created project"
    );

    let with_owner = project_repo
        .find_with_owner(project.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Project vanished after creation".to_string()))?;

    Ok((StatusCode::CREATED, Json(project_response(with_owner))))
}

/// List projects: admins see all, clients see their own.
///
/// GET /api/v1/projects
#[axum::debug_handler]
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let project_repo = ProjectRepository::new(state.pool.clone());

    let entities = if auth.role.is_admin() {
        project_repo.list_all_with_owner().await?
    } else {
        project_repo.list_for_owner_with_owner(auth.user_id).await?
    };

    let projects = entities.into_iter().map(project_response).collect();

    Ok(Json(ListProjectsResponse { projects }))
}

/// Get a single project.
///
/// GET /api/v1/projects/{project_id}
#[axum::debug_handler]
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let project_repo = ProjectRepository::new(state.pool.clone());

    let entity = project_repo
        .find_with_owner(project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if !can_access_project(auth.role, auth.user_id, entity.project.owner_user_id) {
        return Err(ApiError::Forbidden(
            "You do not have access to this project".to_string(),
        ));
    }

    Ok(Json(project_response(entity)))
}

/// Archive or unarchive a project.
///
/// PATCH /api/v1/projects/{project_id}/actions
#[axum::debug_handler]
pub async fn project_actions(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    auth: AuthUser,
    Json(request): Json<ProjectActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let project_repo = ProjectRepository::new(state.pool.clone());
    let archived = matches!(request.action, ProjectAction::Archive);

    project_repo
        .set_archived(project_id, archived)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    info!(
        project_id = %project_id,
        admin_id = %auth.user_id,
        archived = archived,
        "Changed project archive state"
    );

    let entity = project_repo
        .find_with_owner(project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project_response(entity)))
}

/// Permanently delete a project. Ledger entries cascade.
///
/// DELETE /api/v1/projects/{project_id}
#[axum::debug_handler]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let project_repo = ProjectRepository::new(state.pool.clone());
    let deleted = project_repo.delete(project_id).await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    info!(
        project_id = %project_id,
        admin_id = %auth.user_id,
        "Deleted project"
    );

    Ok(Json(AckResponse {
        success: true,
        message: "Project deleted successfully".to_string(),
    }))
}

/// Submit a change to one editable project field.
///
/// Admin changes and editing preferences apply immediately and are recorded
/// as AUTO_APPLIED. Other client changes are recorded as PENDING and wait
/// for admin resolution; the first pending entry of a batch triggers one
/// alert email to the studio admin.
///
/// PATCH /api/v1/projects/{project_id}/fields
#[axum::debug_handler]
pub async fn update_project_field(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    auth: AuthUser,
    Json(request): Json<UpdateFieldRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    let field = EditableField::from_wire_name(&request.field)?;

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

    // Values are parsed up front for both dispositions, so the ledger only
    // ever holds normalized display strings and approval cannot fail on a
    // malformed value later.
    let value = field.parse_value(&request.value)?;
    let old_value = project.display_value(field);
    let new_value = value.to_display_string();

    match classify_update(auth.role, field) {
        UpdateDisposition::AutoApply => {
            let mut tx = state.pool.begin().await?;

            project_repo
                .update_field(&mut *tx, project_id, field, &value)
                .await?
                .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

            modification_repo
                .create_auto_applied(
                    &mut *tx,
                    project_id,
                    field.wire_name(),
                    &old_value,
                    &new_value,
                    auth.user_id,
                )
                .await?;

            // Admin edits are client-visible news; arm the digest gate.
            // Client-made preference edits are their own doing and are not.
            if auth.role.is_admin() && !project.has_unsent_changes {
                project_repo
                    .set_has_unsent_changes(&mut *tx, project_id, true)
                    .await?;
            }

            tx.commit().await?;

            info!(
                project_id = %project_id,
                field = %field,
                user_id = %auth.user_id,
                "Field update auto-applied"
            );

            let entity = project_repo
                .find_with_owner(project_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

            Ok(Json(UpdateFieldResponse {
                applied: true,
                message: None,
                project: Some(project_response(entity)),
            }))
        }
        UpdateDisposition::RequiresApproval => {
            modification_repo
                .create_pending(
                    project_id,
                    field.wire_name(),
                    &old_value,
                    &new_value,
                    auth.user_id,
                )
                .await?;

            info!(
                project_id = %project_id,
                field = %field,
                user_id = %auth.user_id,
                "Field update queued for approval"
            );

            // Dedup gate: one admin alert per unresolved batch. The flag is
            // only set after a successful send, so a failed send is retried
            // by the next submission.
            if !project.admin_notified_of_changes {
                if let Some(admin_email) = state.email.admin_email() {
                    let user_repo = UserRepository::new(state.pool.clone());
                    let client_label = user_repo
                        .find_by_id(auth.user_id)
                        .await?
                        .map(|u| u.display_name.unwrap_or(u.email))
                        .unwrap_or_else(|| auth.user_id.to_string());

                    let send_result = state
                        .email
                        .send_pending_changes_alert(
                            admin_email,
                            &client_label,
                            &project.name,
                            &project_link(&state, project_id),
                        )
                        .await;

                    match send_result {
                        Ok(()) => {
                            record_email_sent("pending_alert", true);
                            project_repo.set_admin_notified(project_id, true).await?;
                        }
                        Err(e) => {
                            record_email_sent("pending_alert", false);
                            warn!(
                                project_id = %project_id,
                                error = %e,
                                "Failed to send pending-changes alert; will retry on next submission"
                            );
                        }
                    }
                }
            }

            Ok(Json(UpdateFieldResponse {
                applied: false,
                message: Some(PENDING_APPROVAL_MESSAGE.to_string()),
                project: None,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use persistence::entities::ProjectEntity;

    fn with_owner() -> ProjectWithOwnerEntity {
        ProjectWithOwnerEntity {
            project: ProjectEntity {
                id: Uuid::new_v4(),
                owner_user_id: Uuid::new_v4(),
                name: "Ana & Mihai".to_string(),
                project_type: "Wedding".to_string(),
                status: "Planning".to_string(),
                event_date: None,
                title_video: None,
                city: Some("Bucuresti".to_string()),
                civil_union_details: None,
                prep: None,
                church: None,
                session_notes: None,
                restaurant: None,
                details_extra: None,
                editing_preferences: None,
                admin_notified_of_changes: false,
                has_unsent_changes: true,
                last_client_notification_date: None,
                is_archived: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            owner_email: "ana@example.com".to_string(),
            owner_display_name: Some("Ana Pop".to_string()),
        }
    }

    #[test]
    fn test_project_response_mapping() {
        let entity = with_owner();
        let id = entity.project.id;
        let owner_id = entity.project.owner_user_id;

        let response = project_response(entity);
        assert_eq!(response.id, id);
        assert_eq!(response.owner.id, owner_id);
        assert_eq!(response.owner.email, "ana@example.com");
        assert_eq!(response.city.as_deref(), Some("Bucuresti"));
        assert!(response.has_unsent_changes);
    }
}
