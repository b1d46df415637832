use crate::{Error, Result};

use super::{
    service::{check_quota, parse_identifier, required_fields, validate_field_rules, validate_payload},
    store::NoteStore,
    DeleteNoteResponse, NewNote, Note, NOTE_QUOTA,
};

fn no_note_found(id: &str) -> Error {
    Error::NotFound(format!("No Note found with id: {id}"))
}

pub async fn create_note(store: &dyn NoteStore, body: &[u8]) -> Result<Note> {
    let payload = validate_payload(body)?;

    if !check_quota(store.count().await?) {
        return Err(Error::QuotaExceeded);
    }

    let candidate = required_fields(payload)?;
    validate_field_rules(&candidate)?;

    let note = store
        .create_within_quota(candidate, NOTE_QUOTA)
        .await?
        .ok_or(Error::QuotaExceeded)?;

    tracing::info!("note {} has been created", note.id.simple());
    Ok(note)
}

pub async fn get_note(store: &dyn NoteStore, raw_id: &str) -> Result<Note> {
    let Some(id) = parse_identifier(raw_id)? else {
        return Err(no_note_found(raw_id));
    };

    store.find_by_id(id).await?.ok_or_else(|| no_note_found(raw_id))
}

pub async fn find_notes(store: &dyn NoteStore) -> Result<Vec<Note>> {
    store.find_all().await
}

pub async fn update_note(store: &dyn NoteStore, raw_id: &str, body: &[u8]) -> Result<Note> {
    let id = parse_identifier(raw_id)?;
    let changes = validate_payload(body)?;

    let Some(id) = id else {
        return Err(no_note_found(raw_id));
    };
    let mut note = store.find_by_id(id).await?.ok_or_else(|| no_note_found(raw_id))?;

    note.merge(changes);
    validate_field_rules(&NewNote::from(&note))?;

    let note = store.save(note).await?;

    tracing::info!("note {} has been updated", note.id.simple());
    Ok(note)
}

pub async fn delete_note(store: &dyn NoteStore, raw_id: &str) -> Result<DeleteNoteResponse> {
    let not_found = || Error::NotFound("Not found.".into());

    let Some(id) = parse_identifier(raw_id)? else {
        return Err(not_found());
    };
    let note = store.delete_by_id(id).await?.ok_or_else(not_found)?;

    tracing::info!("note {} has been removed", note.id.simple());
    Ok(DeleteNoteResponse {
        message: format!("Removed note with id: {}", note.id.simple()),
        note,
    })
}
