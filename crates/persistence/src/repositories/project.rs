//! Project repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{EditableField, FieldValue};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ProjectEntity, ProjectWithOwnerEntity};
use crate::metrics::QueryTimer;

const PROJECT_COLUMNS: &str = "id, owner_user_id, name, project_type, status, event_date, \
    title_video, city, civil_union_details, prep, church, session_notes, restaurant, \
    details_extra, editing_preferences, admin_notified_of_changes, has_unsent_changes, \
    last_client_notification_date, is_archived, created_at, updated_at";

const PROJECT_WITH_OWNER_COLUMNS: &str = "p.id, p.owner_user_id, p.name, p.project_type, \
    p.status, p.event_date, p.title_video, p.city, p.civil_union_details, p.prep, p.church, \
    p.session_notes, p.restaurant, p.details_extra, p.editing_preferences, \
    p.admin_notified_of_changes, p.has_unsent_changes, p.last_client_notification_date, \
    p.is_archived, p.created_at, p.updated_at, \
    u.email AS owner_email, u.display_name AS owner_display_name";

/// Input for creating a project record.
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    pub owner_user_id: Uuid,
    pub name: String,
    pub project_type: String,
    pub status: String,
    pub event_date: DateTime<Utc>,
}

/// Column targeted by an editable-field update.
fn column_name(field: EditableField) -> &'static str {
    match field {
        EditableField::EventDate => "event_date",
        EditableField::TitleVideo => "title_video",
        EditableField::City => "city",
        EditableField::CivilUnionDetails => "civil_union_details",
        EditableField::Prep => "prep",
        EditableField::Church => "church",
        EditableField::SessionNotes => "session_notes",
        EditableField::Restaurant => "restaurant",
        EditableField::DetailsExtra => "details_extra",
        EditableField::EditingPreferences => "editing_preferences",
    }
}

/// Repository for project database operations.
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Creates a new ProjectRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new project.
    pub async fn create(&self, input: CreateProjectInput) -> Result<ProjectEntity, sqlx::Error> {
        let timer = QueryTimer::new("project_create");
        let result = sqlx::query_as::<_, ProjectEntity>(&format!(
            r#"
            INSERT INTO projects (owner_user_id, name, project_type, status, event_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(input.owner_user_id)
        .bind(&input.name)
        .bind(&input.project_type)
        .bind(&input.status)
        .bind(input.event_date)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a project by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("project_find_by_id");
        let result = sqlx::query_as::<_, ProjectEntity>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a project joined with its owner's contact details.
    pub async fn find_with_owner(
        &self,
        id: Uuid,
    ) -> Result<Option<ProjectWithOwnerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("project_find_with_owner");
        let result = sqlx::query_as::<_, ProjectWithOwnerEntity>(&format!(
            "SELECT {PROJECT_WITH_OWNER_COLUMNS} FROM projects p \
             JOIN users u ON p.owner_user_id = u.id WHERE p.id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List every project with owner details, newest first.
    pub async fn list_all_with_owner(&self) -> Result<Vec<ProjectWithOwnerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("project_list_all_with_owner");
        let result = sqlx::query_as::<_, ProjectWithOwnerEntity>(&format!(
            "SELECT {PROJECT_WITH_OWNER_COLUMNS} FROM projects p \
             JOIN users u ON p.owner_user_id = u.id ORDER BY p.created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a client's projects with owner details, newest first.
    pub async fn list_for_owner_with_owner(
        &self,
        owner_user_id: Uuid,
    ) -> Result<Vec<ProjectWithOwnerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("project_list_for_owner_with_owner");
        let result = sqlx::query_as::<_, ProjectWithOwnerEntity>(&format!(
            "SELECT {PROJECT_WITH_OWNER_COLUMNS} FROM projects p \
             JOIN users u ON p.owner_user_id = u.id WHERE p.owner_user_id = $1 \
             ORDER BY p.created_at DESC",
        ))
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a parsed value to a single editable column.
    ///
    /// Takes an executor so callers can run it inside the same transaction as
    /// the accompanying ledger append.
    pub async fn update_field<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        field: EditableField,
        value: &FieldValue,
    ) -> Result<Option<ProjectEntity>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let timer = QueryTimer::new("project_update_field");
        let column = column_name(field);
        let query = format!(
            "UPDATE projects SET {column} = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}",
        );

        let result = match value {
            FieldValue::Date(date) => {
                sqlx::query_as::<_, ProjectEntity>(&query)
                    .bind(project_id)
                    .bind(*date)
                    .fetch_optional(executor)
                    .await
            }
            other => {
                sqlx::query_as::<_, ProjectEntity>(&query)
                    .bind(project_id)
                    .bind(other.to_display_string())
                    .fetch_optional(executor)
                    .await
            }
        };
        timer.record();
        result
    }

    /// Set or clear the "admin has been emailed about pending changes" flag.
    pub async fn set_admin_notified(
        &self,
        project_id: Uuid,
        notified: bool,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("project_set_admin_notified");
        let result = sqlx::query(
            "UPDATE projects SET admin_notified_of_changes = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(project_id)
        .bind(notified)
        .execute(&self.pool)
        .await
        .map(|_| ());
        timer.record();
        result
    }

    /// Flag the project as carrying admin changes the client has not seen.
    pub async fn set_has_unsent_changes<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        has_unsent: bool,
    ) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let timer = QueryTimer::new("project_set_has_unsent_changes");
        let result = sqlx::query(
            "UPDATE projects SET has_unsent_changes = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(project_id)
        .bind(has_unsent)
        .execute(executor)
        .await
        .map(|_| ());
        timer.record();
        result
    }

    /// Mark the client digest as sent: clear the flag and stamp the date.
    pub async fn mark_digest_sent(
        &self,
        project_id: Uuid,
    ) -> Result<Option<ProjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("project_mark_digest_sent");
        let result = sqlx::query_as::<_, ProjectEntity>(&format!(
            "UPDATE projects SET has_unsent_changes = FALSE, \
             last_client_notification_date = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING {PROJECT_COLUMNS}",
        ))
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Archive or unarchive a project.
    pub async fn set_archived(
        &self,
        project_id: Uuid,
        archived: bool,
    ) -> Result<Option<ProjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("project_set_archived");
        let result = sqlx::query_as::<_, ProjectEntity>(&format!(
            "UPDATE projects SET is_archived = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}",
        ))
        .bind(project_id)
        .bind(archived)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a project; ledger rows cascade.
    pub async fn delete(&self, project_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("project_delete");
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected());
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_name_covers_every_field() {
        for field in EditableField::ALL {
            assert!(!column_name(field).is_empty());
        }
    }

    #[test]
    fn test_column_names_are_unique() {
        let mut names: Vec<_> = EditableField::ALL.iter().map(|f| column_name(*f)).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), EditableField::ALL.len());
    }
}
