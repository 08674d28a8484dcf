//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{RoleDb, UserEntity};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, email, display_name, password_hash, role, created_at";

/// Input for creating a user record.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub role: RoleDb,
}

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    pub async fn create(&self, input: CreateUserInput) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("user_create");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (email, display_name, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(&input.password_hash)
        .bind(input.role)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("user_find_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("user_find_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_input() {
        let input = CreateUserInput {
            email: "ana@example.com".to_string(),
            display_name: Some("Ana Pop".to_string()),
            password_hash: "$argon2id$stub".to_string(),
            role: RoleDb::Client,
        };
        assert_eq!(input.email, "ana@example.com");
        assert_eq!(input.role, RoleDb::Client);
    }
}
