//! Domain layer for the Wedding Portal backend.
//!
//! This crate contains:
//! - Domain models (projects, modifications, users, editable fields)
//! - Pure business logic (field update policy)
//! - Domain error types

pub mod models;
pub mod services;
