//! Editable project fields.
//!
//! The portal exposes a fixed set of project fields that clients and admins
//! can edit through the modification workflow. Each field carries a semantic
//! kind that decides how submitted values are parsed and how stored values
//! are rendered back into the ledger's display strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for field name lookup and value parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldParseError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid date value: {0}")]
    InvalidDate(String),

    #[error("Invalid boolean value: {0}")]
    InvalidBool(String),
}

/// Semantic kind of an editable field.
///
/// `Bool` has no current field but remains in the kind set so that
/// boolean-valued ledger rows from the legacy civil-union schema still
/// normalize the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Date,
    Bool,
}

/// A parsed field value, typed per the field's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(DateTime<Utc>),
    Bool(bool),
}

impl FieldValue {
    /// Render the value as the ledger's display string.
    ///
    /// Dates use ISO 8601, booleans "true"/"false", text is passed through.
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Date(d) => d.to_rfc3339(),
            FieldValue::Bool(b) => b.to_string(),
        }
    }
}

/// The closed set of project fields editable through the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditableField {
    EventDate,
    TitleVideo,
    City,
    CivilUnionDetails,
    Prep,
    Church,
    SessionNotes,
    Restaurant,
    DetailsExtra,
    EditingPreferences,
}

impl EditableField {
    /// Every editable field, in presentation order.
    pub const ALL: [EditableField; 10] = [
        EditableField::EventDate,
        EditableField::TitleVideo,
        EditableField::City,
        EditableField::CivilUnionDetails,
        EditableField::Prep,
        EditableField::Church,
        EditableField::SessionNotes,
        EditableField::Restaurant,
        EditableField::DetailsExtra,
        EditableField::EditingPreferences,
    ];

    /// Resolve a wire name (as submitted by the frontend) to a field.
    pub fn from_wire_name(name: &str) -> Result<Self, FieldParseError> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.wire_name() == name)
            .ok_or_else(|| FieldParseError::UnknownField(name.to_string()))
    }

    /// Wire name used in API payloads and ledger `field_name` values.
    pub fn wire_name(&self) -> &'static str {
        match self {
            EditableField::EventDate => "eventDate",
            EditableField::TitleVideo => "titleVideo",
            EditableField::City => "city",
            EditableField::CivilUnionDetails => "civilUnionDetails",
            EditableField::Prep => "prep",
            EditableField::Church => "church",
            EditableField::SessionNotes => "sessionNotes",
            EditableField::Restaurant => "restaurant",
            EditableField::DetailsExtra => "detailsExtra",
            EditableField::EditingPreferences => "editingPreferences",
        }
    }

    /// Human-readable name used in client digest emails.
    pub fn display_name(&self) -> &'static str {
        match self {
            EditableField::EventDate => "Event date",
            EditableField::TitleVideo => "Video title",
            EditableField::City => "City",
            EditableField::CivilUnionDetails => "Civil union details",
            EditableField::Prep => "Preparations",
            EditableField::Church => "Church",
            EditableField::SessionNotes => "Photo session",
            EditableField::Restaurant => "Restaurant",
            EditableField::DetailsExtra => "Extra details",
            EditableField::EditingPreferences => "Editing preferences",
        }
    }

    /// Semantic kind of the field.
    pub fn kind(&self) -> FieldKind {
        match self {
            EditableField::EventDate => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }

    /// Whether this field bypasses the approval workflow for every role.
    ///
    /// Editing preferences are low-risk free text and always apply directly.
    pub fn always_auto_applies(&self) -> bool {
        matches!(self, EditableField::EditingPreferences)
    }

    /// Parse a submitted raw value into a typed value per the field's kind.
    pub fn parse_value(&self, raw: &str) -> Result<FieldValue, FieldParseError> {
        parse_by_kind(self.kind(), raw)
    }
}

impl std::fmt::Display for EditableField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Parse a raw string into a typed value for the given kind.
pub fn parse_by_kind(kind: FieldKind, raw: &str) -> Result<FieldValue, FieldParseError> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Date => parse_date(raw).map(FieldValue::Date),
        FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            _ => Err(FieldParseError::InvalidBool(raw.to_string())),
        },
    }
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date at midnight UTC.
fn parse_date(raw: &str) -> Result<DateTime<Utc>, FieldParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc())
        .map_err(|_| FieldParseError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_wire_name_resolves_all_fields() {
        for field in EditableField::ALL {
            assert_eq!(EditableField::from_wire_name(field.wire_name()), Ok(field));
        }
    }

    #[test]
    fn test_from_wire_name_rejects_unknown() {
        let err = EditableField::from_wire_name("ownerUserId").unwrap_err();
        assert_eq!(err, FieldParseError::UnknownField("ownerUserId".to_string()));
    }

    #[test]
    fn test_from_wire_name_is_case_sensitive() {
        assert!(EditableField::from_wire_name("eventdate").is_err());
    }

    #[test]
    fn test_event_date_is_the_only_date_field() {
        for field in EditableField::ALL {
            let expected = matches!(field, EditableField::EventDate);
            assert_eq!(field.kind() == FieldKind::Date, expected);
        }
    }

    #[test]
    fn test_only_editing_preferences_always_auto_applies() {
        for field in EditableField::ALL {
            let expected = matches!(field, EditableField::EditingPreferences);
            assert_eq!(field.always_auto_applies(), expected);
        }
    }

    #[test]
    fn test_parse_text_passes_through() {
        let value = EditableField::City.parse_value("Cluj").unwrap();
        assert_eq!(value, FieldValue::Text("Cluj".to_string()));
        assert_eq!(value.to_display_string(), "Cluj");
    }

    #[test]
    fn test_parse_rfc3339_date() {
        let value = EditableField::EventDate
            .parse_value("2026-09-12T10:30:00Z")
            .unwrap();
        let expected = Utc.with_ymd_and_hms(2026, 9, 12, 10, 30, 0).unwrap();
        assert_eq!(value, FieldValue::Date(expected));
    }

    #[test]
    fn test_parse_bare_date_at_midnight_utc() {
        let value = EditableField::EventDate.parse_value("2026-09-12").unwrap();
        let expected = Utc.with_ymd_and_hms(2026, 9, 12, 0, 0, 0).unwrap();
        assert_eq!(value, FieldValue::Date(expected));
    }

    #[test]
    fn test_parse_invalid_date() {
        let err = EditableField::EventDate.parse_value("next June").unwrap_err();
        assert_eq!(err, FieldParseError::InvalidDate("next June".to_string()));
    }

    #[test]
    fn test_parse_bool_kind() {
        assert_eq!(
            parse_by_kind(FieldKind::Bool, "true").unwrap(),
            FieldValue::Bool(true)
        );
        assert_eq!(
            parse_by_kind(FieldKind::Bool, "FALSE").unwrap(),
            FieldValue::Bool(false)
        );
        assert!(parse_by_kind(FieldKind::Bool, "yes").is_err());
    }

    #[test]
    fn test_display_string_normalization() {
        let date = Utc.with_ymd_and_hms(2026, 9, 12, 0, 0, 0).unwrap();
        assert_eq!(
            FieldValue::Date(date).to_display_string(),
            "2026-09-12T00:00:00+00:00"
        );
        assert_eq!(FieldValue::Bool(true).to_display_string(), "true");
    }

    #[test]
    fn test_display_uses_wire_name() {
        assert_eq!(EditableField::SessionNotes.to_string(), "sessionNotes");
    }
}
