//! Shared utilities and common types for the Wedding Portal backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT token generation and validation
//! - Password hashing with Argon2id
//! - Temporary credential generation for provisioned client accounts

pub mod jwt;
pub mod password;
