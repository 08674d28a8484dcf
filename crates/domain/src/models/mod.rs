//! Domain models for the Wedding Portal.

pub mod field;
pub mod modification;
pub mod project;
pub mod user;

pub use field::{EditableField, FieldKind, FieldParseError, FieldValue};
pub use modification::ModificationStatus;
pub use user::Role;
