//! Modification ledger entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::ModificationStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for modification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "modification_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModificationStatusDb {
    Pending,
    Approved,
    Rejected,
    AutoApplied,
}

impl From<ModificationStatusDb> for ModificationStatus {
    fn from(status: ModificationStatusDb) -> Self {
        match status {
            ModificationStatusDb::Pending => ModificationStatus::Pending,
            ModificationStatusDb::Approved => ModificationStatus::Approved,
            ModificationStatusDb::Rejected => ModificationStatus::Rejected,
            ModificationStatusDb::AutoApplied => ModificationStatus::AutoApplied,
        }
    }
}

impl From<ModificationStatus> for ModificationStatusDb {
    fn from(status: ModificationStatus) -> Self {
        match status {
            ModificationStatus::Pending => ModificationStatusDb::Pending,
            ModificationStatus::Approved => ModificationStatusDb::Approved,
            ModificationStatus::Rejected => ModificationStatusDb::Rejected,
            ModificationStatus::AutoApplied => ModificationStatusDb::AutoApplied,
        }
    }
}

/// Database row mapping for the project_modifications table.
#[derive(Debug, Clone, FromRow)]
pub struct ModificationEntity {
    pub id: Uuid,
    pub project_id: Uuid,
    pub field_name: String,
    pub old_value: String,
    pub new_value: String,
    pub status: ModificationStatusDb,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_round_trip() {
        for status in [
            ModificationStatus::Pending,
            ModificationStatus::Approved,
            ModificationStatus::Rejected,
            ModificationStatus::AutoApplied,
        ] {
            let db: ModificationStatusDb = status.into();
            let back: ModificationStatus = db.into();
            assert_eq!(back, status);
        }
    }
}
