use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use crate::{Error, Result, DB};

use super::{NewNote, Note, NoteId};

/// Storage contract used by the note handlers. Implementations hold no
/// business rules; quota and field checks happen before these are called.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn count(&self) -> Result<u64>;

    async fn create(&self, note: NewNote) -> Result<Note>;

    /// Inserts only while fewer than `quota` notes are stored. Returns `None` when
    /// the quota is already met.
    ///
    /// The default implementation counts and then inserts, so concurrent callers
    /// can overshoot the quota. Stores that can do better should override it.
    async fn create_within_quota(&self, note: NewNote, quota: u64) -> Result<Option<Note>> {
        if self.count().await? >= quota {
            return Ok(None);
        }
        self.create(note).await.map(Some)
    }

    async fn find_by_id(&self, id: NoteId) -> Result<Option<Note>>;

    async fn find_all(&self) -> Result<Vec<Note>>;

    /// Persists the fields of an existing note and refreshes `updated_at`.
    async fn save(&self, note: Note) -> Result<Note>;

    async fn delete_by_id(&self, id: NoteId) -> Result<Option<Note>>;
}

const NOTE_COLUMNS: &str = "id, title, description, reminder, created_at, updated_at";

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            reminder: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

#[derive(Clone)]
pub struct SqliteNoteStore {
    db: DB,
}

impl SqliteNoteStore {
    pub fn new(db: DB) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn count(&self) -> Result<u64> {
        Ok(self
            .db
            .call(|conn| Ok(conn.query_row("SELECT count(*) FROM notes", [], |row| row.get::<_, u64>(0))?))
            .await?)
    }

    async fn create(&self, NewNote { title, description, reminder }: NewNote) -> Result<Note> {
        Ok(self
            .db
            .call(move |conn| {
                let now = chrono::Utc::now();
                Ok(conn.query_row(
                    &format!(
                        "INSERT INTO notes (title, description, reminder, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)
                        RETURNING {NOTE_COLUMNS}"
                    ),
                    params![title, description, reminder, now],
                    |row| Note::try_from(row),
                )?)
            })
            .await?)
    }

    async fn create_within_quota(
        &self,
        NewNote { title, description, reminder }: NewNote,
        quota: u64,
    ) -> Result<Option<Note>> {
        Ok(self
            .db
            .call(move |conn| {
                let now = chrono::Utc::now();
                Ok(conn
                    .query_row(
                        &format!(
                            "INSERT INTO notes (title, description, reminder, created_at, updated_at)
                            SELECT ?1, ?2, ?3, ?4, ?4 WHERE (SELECT count(*) FROM notes) < ?5
                            RETURNING {NOTE_COLUMNS}"
                        ),
                        params![title, description, reminder, now, quota],
                        |row| Note::try_from(row),
                    )
                    .optional()?)
            })
            .await?)
    }

    async fn find_by_id(&self, id: NoteId) -> Result<Option<Note>> {
        Ok(self
            .db
            .call(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"),
                        params![id],
                        |row| Note::try_from(row),
                    )
                    .optional()?)
            })
            .await?)
    }

    async fn find_all(&self) -> Result<Vec<Note>> {
        Ok(self
            .db
            .call(|conn| {
                let notes = conn
                    .prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at, id"))?
                    .query_map([], |row| Note::try_from(row))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await?)
    }

    async fn save(&self, note: Note) -> Result<Note> {
        Ok(self
            .db
            .call(move |conn| {
                let saved = conn
                    .query_row(
                        &format!(
                            "UPDATE notes SET title = ?, description = ?, reminder = ?, updated_at = ?
                            WHERE id = ?
                            RETURNING {NOTE_COLUMNS}"
                        ),
                        params![note.title, note.description, note.reminder, chrono::Utc::now(), note.id],
                        |row| Note::try_from(row),
                    )
                    .optional()?
                    .ok_or_else(|| Error::NotFound(format!("No Note found with id: {}", note.id.simple())))?;
                Ok(saved)
            })
            .await?)
    }

    async fn delete_by_id(&self, id: NoteId) -> Result<Option<Note>> {
        Ok(self
            .db
            .call(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("DELETE FROM notes WHERE id = ? RETURNING {NOTE_COLUMNS}"),
                        params![id],
                        |row| Note::try_from(row),
                    )
                    .optional()?)
            })
            .await?)
    }
}
