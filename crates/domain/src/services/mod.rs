//! Domain services.

pub mod update_policy;

pub use update_policy::{classify_update, UpdateDisposition};
