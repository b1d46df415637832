use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{Error, Result};

pub type NoteId = Uuid;

/// Maximum number of notes stored at any time.
pub const NOTE_QUOTA: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(with = "uuid::serde::simple")]
    pub id: NoteId,
    pub title: String,
    pub description: String,
    pub reminder: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Field set of a note as it is checked before it reaches the store.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewNote {
    #[validate(length(min = 1), custom(function = "alphanumeric"))]
    pub title: String,
    #[validate(length(min = 1), custom(function = "alphanumeric"))]
    pub description: String,
    pub reminder: bool,
}

impl From<&Note> for NewNote {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            description: note.description.clone(),
            reminder: note.reminder,
        }
    }
}

/// Letters and digits only, the same rule used for path identifiers.
pub fn is_alphanumeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

fn alphanumeric(value: &str) -> std::result::Result<(), ValidationError> {
    if is_alphanumeric(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("alphanumeric");
    error.message = Some(Cow::from("must contain only letters and digits"));
    Err(error)
}

/// Typed view over an inbound JSON body. Every field is optional here; which
/// ones are required depends on the operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reminder: Option<bool>,
}

impl NotePayload {
    /// Decodes the known fields of a JSON object. Unknown keys are ignored, `null`
    /// counts as absent, and a known key holding the wrong type is rejected.
    pub fn from_object(object: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            title: string_field(object, "title")?,
            description: string_field(object, "description")?,
            reminder: bool_field(object, "reminder")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.reminder.is_none()
    }
}

fn string_field(object: &Map<String, Value>, field: &'static str) -> Result<Option<String>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(value) => Err(Error::InvalidField {
            field,
            value: value.to_string(),
        }),
    }
}

fn bool_field(object: &Map<String, Value>, field: &'static str) -> Result<Option<bool>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(value) => Err(Error::InvalidField {
            field,
            value: value.to_string(),
        }),
    }
}

impl Note {
    /// Partial update: a field is overwritten only when the incoming value is
    /// truthy. Empty strings and `reminder: false` leave the stored value alone.
    pub fn merge(&mut self, changes: NotePayload) {
        if let Some(title) = changes.title.filter(|t| !t.is_empty()) {
            self.title = title;
        }
        if let Some(description) = changes.description.filter(|d| !d.is_empty()) {
            self.description = description;
        }
        if changes.reminder == Some(true) {
            self.reminder = true;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteNoteResponse {
    pub message: String,
    pub note: Note,
}
