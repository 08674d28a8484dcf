//! Modification ledger repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ModificationEntity, ModificationStatusDb};
use crate::metrics::QueryTimer;

const MODIFICATION_COLUMNS: &str = "id, project_id, field_name, old_value, new_value, status, \
    created_by, approved_by, approved_at, notes, created_at";

/// Repository for modification ledger database operations.
#[derive(Clone)]
pub struct ModificationRepository {
    pool: PgPool,
}

impl ModificationRepository {
    /// Creates a new ModificationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a PENDING entry awaiting admin resolution.
    pub async fn create_pending(
        &self,
        project_id: Uuid,
        field_name: &str,
        old_value: &str,
        new_value: &str,
        created_by: Uuid,
    ) -> Result<ModificationEntity, sqlx::Error> {
        let timer = QueryTimer::new("modification_create_pending");
        let result = sqlx::query_as::<_, ModificationEntity>(&format!(
            r#"
            INSERT INTO project_modifications
                (project_id, field_name, old_value, new_value, status, created_by)
            VALUES ($1, $2, $3, $4, 'PENDING', $5)
            RETURNING {MODIFICATION_COLUMNS}
            "#,
        ))
        .bind(project_id)
        .bind(field_name)
        .bind(old_value)
        .bind(new_value)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Append an AUTO_APPLIED entry, created already resolved by its author.
    ///
    /// Takes an executor so the append can share a transaction with the
    /// project mutation it records.
    pub async fn create_auto_applied<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        field_name: &str,
        old_value: &str,
        new_value: &str,
        created_by: Uuid,
    ) -> Result<ModificationEntity, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let timer = QueryTimer::new("modification_create_auto_applied");
        let result = sqlx::query_as::<_, ModificationEntity>(&format!(
            r#"
            INSERT INTO project_modifications
                (project_id, field_name, old_value, new_value, status, created_by,
                 approved_by, approved_at)
            VALUES ($1, $2, $3, $4, 'AUTO_APPLIED', $5, $5, NOW())
            RETURNING {MODIFICATION_COLUMNS}
            "#,
        ))
        .bind(project_id)
        .bind(field_name)
        .bind(old_value)
        .bind(new_value)
        .bind(created_by)
        .fetch_one(executor)
        .await;
        timer.record();
        result
    }

    /// Find a ledger entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ModificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("modification_find_by_id");
        let result = sqlx::query_as::<_, ModificationEntity>(&format!(
            "SELECT {MODIFICATION_COLUMNS} FROM project_modifications WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all ledger entries for a project, newest first.
    pub async fn list_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<ModificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("modification_list_for_project");
        let result = sqlx::query_as::<_, ModificationEntity>(&format!(
            "SELECT {MODIFICATION_COLUMNS} FROM project_modifications \
             WHERE project_id = $1 ORDER BY created_at DESC",
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Resolve a PENDING entry to APPROVED or REJECTED.
    ///
    /// The status check is part of the UPDATE predicate, so a concurrent
    /// resolver loses the race and gets `None` instead of double-applying.
    pub async fn resolve<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ModificationStatusDb,
        approved_by: Uuid,
        notes: Option<&str>,
    ) -> Result<Option<ModificationEntity>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let timer = QueryTimer::new("modification_resolve");
        let result = sqlx::query_as::<_, ModificationEntity>(&format!(
            r#"
            UPDATE project_modifications
            SET status = $2, approved_by = $3, approved_at = NOW(), notes = $4
            WHERE id = $1 AND status = 'PENDING'
            RETURNING {MODIFICATION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .bind(approved_by)
        .bind(notes)
        .fetch_optional(executor)
        .await;
        timer.record();
        result
    }

    /// Count PENDING entries for a project.
    pub async fn count_pending_for_project(&self, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("modification_count_pending");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM project_modifications \
             WHERE project_id = $1 AND status = 'PENDING'",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List AUTO_APPLIED entries created since the given instant, newest
    /// first. Feeds the client digest email.
    pub async fn list_auto_applied_since(
        &self,
        project_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<ModificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("modification_list_auto_applied_since");
        let result = sqlx::query_as::<_, ModificationEntity>(&format!(
            "SELECT {MODIFICATION_COLUMNS} FROM project_modifications \
             WHERE project_id = $1 AND status = 'AUTO_APPLIED' AND created_at >= $2 \
             ORDER BY created_at DESC",
        ))
        .bind(project_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Bulk-reject stale PENDING entries for the always-auto-applied
    /// preferences field. Returns the number of rows cleaned.
    pub async fn reject_stale_preferences(
        &self,
        field_name: &str,
        note: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("modification_reject_stale_preferences");
        let result = sqlx::query(
            "UPDATE project_modifications SET status = 'REJECTED', notes = $2 \
             WHERE field_name = $1 AND status = 'PENDING'",
        )
        .bind(field_name)
        .bind(note)
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
    fn test_modification_columns_include_resolution_fields() {
        for column in ["approved_by", "approved_at", "notes"] {
            assert!(MODIFICATION_COLUMNS.contains(column));
        }
    }
}
