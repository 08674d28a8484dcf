//! Authenticated user extractor.
//!
//! Session issuance happens outside this backend; every operation here only
//! needs the resolved `{user_id, role}` fact from the bearer token.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Role;
use std::str::FromStr;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user information from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// Role claim, parsed into the closed role enum.
    pub role: Role,
}

impl AuthUser {
    /// Shorthand for admin-only handlers.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let claims = state
            .jwt
            .validate_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))?;

        let role = Role::from_str(&claims.role)
            .map_err(|_| ApiError::Unauthorized("Invalid token role".to_string()))?;

        Ok(AuthUser { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin_for_admin() {
        let auth = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(auth.require_admin().is_ok());
    }

    #[test]
    fn test_require_admin_for_client() {
        let auth = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Client,
        };
        match auth.require_admin() {
            Err(ApiError::Forbidden(_)) => {}
            other => panic!("Expected Forbidden, got {:?}", other.err()),
        }
    }
}
