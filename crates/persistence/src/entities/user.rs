//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Role;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum RoleDb {
    Admin,
    Client,
}

impl From<RoleDb> for Role {
    fn from(role: RoleDb) -> Self {
        match role {
            RoleDb::Admin => Role::Admin,
            RoleDb::Client => Role::Client,
        }
    }
}

impl From<Role> for RoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => RoleDb::Admin,
            Role::Client => RoleDb::Client,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub role: RoleDb,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_db_round_trip() {
        for role in [Role::Admin, Role::Client] {
            let db: RoleDb = role.into();
            let back: Role = db.into();
            assert_eq!(back, role);
        }
    }
}
