//! Project entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::EditableField;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the projects table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectEntity {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub project_type: String,
    pub status: String,
    pub event_date: Option<DateTime<Utc>>,
    pub title_video: Option<String>,
    pub city: Option<String>,
    pub civil_union_details: Option<String>,
    pub prep: Option<String>,
    pub church: Option<String>,
    pub session_notes: Option<String>,
    pub restaurant: Option<String>,
    pub details_extra: Option<String>,
    pub editing_preferences: Option<String>,
    pub admin_notified_of_changes: bool,
    pub has_unsent_changes: bool,
    pub last_client_notification_date: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectEntity {
    /// Current value of an editable field, normalized to the ledger's display
    /// string form: ISO 8601 for dates, empty string for unset fields.
    pub fn display_value(&self, field: EditableField) -> String {
        match field {
            EditableField::EventDate => self
                .event_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            EditableField::TitleVideo => self.title_video.clone().unwrap_or_default(),
            EditableField::City => self.city.clone().unwrap_or_default(),
            EditableField::CivilUnionDetails => {
                self.civil_union_details.clone().unwrap_or_default()
            }
            EditableField::Prep => self.prep.clone().unwrap_or_default(),
            EditableField::Church => self.church.clone().unwrap_or_default(),
            EditableField::SessionNotes => self.session_notes.clone().unwrap_or_default(),
            EditableField::Restaurant => self.restaurant.clone().unwrap_or_default(),
            EditableField::DetailsExtra => self.details_extra.clone().unwrap_or_default(),
            EditableField::EditingPreferences => {
                self.editing_preferences.clone().unwrap_or_default()
            }
        }
    }
}

/// Project row joined with its owner's contact details, for responses and
/// the outbound digest.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectWithOwnerEntity {
    #[sqlx(flatten)]
    pub project: ProjectEntity,
    pub owner_email: String,
    pub owner_display_name: Option<String>,
}
