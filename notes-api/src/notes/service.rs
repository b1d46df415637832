use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{Error, Result};

use super::{is_alphanumeric, NewNote, NoteId, NotePayload, NOTE_QUOTA};

pub fn validate_identifier(raw: &str) -> bool {
    is_alphanumeric(raw)
}

/// Checks the identifier format, then tries to read it as a note id. A
/// well-formed identifier that is not a UUID cannot name a stored note, so it
/// yields `None` rather than an error.
pub fn parse_identifier(raw: &str) -> Result<Option<NoteId>> {
    if !validate_identifier(raw) {
        return Err(Error::IncorrectId);
    }
    Ok(Uuid::try_parse(raw).ok())
}

/// Decodes a raw request body. Anything that does not amount to a non-empty JSON
/// object with at least one known field counts as missing details.
pub fn validate_payload(raw: &[u8]) -> Result<NotePayload> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::MissingDetails);
    }

    let value: Value = serde_json::from_slice(raw).map_err(|e| {
        tracing::debug!("unreadable request body: {e}");
        Error::MissingDetails
    })?;

    let object = match value {
        Value::Object(object) if !object.is_empty() => object,
        _ => return Err(Error::MissingDetails),
    };

    let payload = NotePayload::from_object(&object)?;
    if payload.is_empty() {
        return Err(Error::MissingDetails);
    }
    Ok(payload)
}

pub fn check_quota(current_count: u64) -> bool {
    current_count < NOTE_QUOTA
}

/// Builds the candidate for a new note. `reminder` falls back to `false`.
pub fn required_fields(payload: NotePayload) -> Result<NewNote> {
    let NotePayload {
        title: Some(title),
        description: Some(description),
        reminder,
    } = payload
    else {
        return Err(Error::MissingDetails);
    };

    Ok(NewNote {
        title,
        description,
        reminder: reminder.unwrap_or(false),
    })
}

pub fn validate_field_rules(candidate: &NewNote) -> Result<()> {
    candidate.validate().map_err(Error::IncorrectDetails)
}
