use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{state::AppState, Result};

use super::{handlers, DeleteNoteResponse, Note};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/notes", get(find_notes).post(create_note))
        .route(
            "/api/v1/notes/{note_id}",
            get(get_note).patch(update_note).put(update_note).delete(delete_note),
        )
        .with_state(state)
}

async fn find_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>> {
    handlers::find_notes(state.notes.as_ref()).await.map(Json)
}

async fn create_note(State(state): State<AppState>, body: Bytes) -> Result<Json<Note>> {
    handlers::create_note(state.notes.as_ref(), &body).await.map(Json)
}

async fn get_note(State(state): State<AppState>, Path(note_id): Path<String>) -> Result<Json<Note>> {
    handlers::get_note(state.notes.as_ref(), &note_id).await.map(Json)
}

async fn update_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    body: Bytes,
) -> Result<Json<Note>> {
    handlers::update_note(state.notes.as_ref(), &note_id, &body).await.map(Json)
}

async fn delete_note(State(state): State<AppState>, Path(note_id): Path<String>) -> Result<Json<DeleteNoteResponse>> {
    handlers::delete_note(state.notes.as_ref(), &note_id).await.map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        db::{init_test_db, DB},
        errors::Result,
        notes::{store::SqliteNoteStore, DeleteNoteResponse, Note},
    };
    use axum_test::TestServer;
    use serde_json::{json, Value};

    const NOTE_ID: &str = "018f61385b4f722d97c529b927cedbd4";

    async fn seed(db: &DB, count: usize) {
        db.call(move |conn| {
            for i in 0..count {
                conn.execute(
                    "INSERT INTO notes (title, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                    rusqlite::params![format!("Note{i}"), format!("Body{i}"), chrono::Utc::now()],
                )?;
            }
            Ok(())
        })
        .await
        .unwrap();
    }

    async fn seed_known(db: &DB) {
        db.call(|conn| {
            conn.execute_batch(
                "INSERT INTO notes (id, title, description, reminder) VALUES (uuid_blob('018f6138-5b4f-722d-97c5-29b927cedbd4'), 'first', 'one', 1);",
            )?;
            Ok(())
        })
        .await
        .unwrap();
    }

    async fn count(db: &DB) -> u32 {
        db.call(|conn| Ok(conn.query_row::<u32, _, _>("select count(*) from notes", [], |r| r.get(0))?))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn find_notes() -> Result<()> {
        let db = init_test_db().await?;
        seed(&db, 3).await;

        let server = test_server(db).await?;
        let response = server.get("/api/v1/notes").await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<Vec<Note>>().len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn find_notes_empty() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;
        let response = server.get("/api/v1/notes").await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<Value>(), json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn create_note() -> Result<()> {
        let db = init_test_db().await?;

        let server = test_server(db.clone()).await?;
        let response = server
            .post("/api/v1/notes")
            .json(&json!({
                "title": "world",
                "description": "hello"
            }))
            .await;

        assert_eq!(response.status_code(), 200);
        let note = response.json::<Note>();
        assert_eq!(note.title, "world");
        assert_eq!(note.description, "hello");
        assert!(!note.reminder);
        assert_eq!(count(&db).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_then_get_round_trip() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;
        let created = server
            .post("/api/v1/notes")
            .json(&json!({ "title": "Trip", "description": "Round", "reminder": true }))
            .await
            .json::<Note>();

        let response = server.get(&format!("/api/v1/notes/{}", created.id.simple())).await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<Note>(), created);
        Ok(())
    }

    #[tokio::test]
    async fn create_without_body() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;
        let response = server.post("/api/v1/notes").await;

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>(), json!({ "error": "Missing details" }));
        Ok(())
    }

    #[tokio::test]
    async fn create_with_invalid_field_type() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;
        let response = server
            .post("/api/v1/notes")
            .json(&json!({ "title": "A", "description": "B", "reminder": "yes" }))
            .await;

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>(), json!({ "error": "Error:: Invalid reminder: \"yes\"" }));
        Ok(())
    }

    #[tokio::test]
    async fn create_with_incorrect_details() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db.clone()).await?;
        let response = server
            .post("/api/v1/notes")
            .json(&json!({ "title": "has space", "description": "B" }))
            .await;

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>(), json!({ "error": "Incorrect note details" }));
        assert_eq!(count(&db).await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn create_at_limit() -> Result<()> {
        let db = init_test_db().await?;
        seed(&db, 10).await;

        let server = test_server(db.clone()).await?;
        let response = server
            .post("/api/v1/notes")
            .json(&json!({ "title": "Eleven", "description": "Over" }))
            .await;

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>(), json!({ "error": "Notes' limit reached" }));
        assert_eq!(count(&db).await, 10);
        Ok(())
    }

    #[tokio::test]
    async fn create_reaches_limit() -> Result<()> {
        let db = init_test_db().await?;
        seed(&db, 9).await;

        let server = test_server(db.clone()).await?;
        let response = server
            .post("/api/v1/notes")
            .json(&json!({ "title": "Ten", "description": "Last" }))
            .await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(count(&db).await, 10);
        Ok(())
    }

    #[tokio::test]
    async fn get_note() -> Result<()> {
        let db = init_test_db().await?;
        seed_known(&db).await;

        let server = test_server(db).await?;
        let response = server.get(&format!("/api/v1/notes/{NOTE_ID}")).await;

        assert_eq!(response.status_code(), 200);
        let note = response.json::<Note>();
        assert_eq!(note.title, "first");
        assert_eq!(note.id.simple().to_string(), NOTE_ID);
        assert!(note.reminder);
        Ok(())
    }

    #[tokio::test]
    async fn get_note_with_bad_id() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;
        let response = server.get("/api/v1/notes/018f6138-5b4f-722d-97c5-29b927cedbd4").await;

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>(), json!({ "error": "Incorrect Id." }));
        Ok(())
    }

    #[tokio::test]
    async fn get_missing_note() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;
        let response = server.get(&format!("/api/v1/notes/{NOTE_ID}")).await;

        assert_eq!(response.status_code(), 404);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": format!("No Note found with id: {NOTE_ID}") })
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_note() -> Result<()> {
        let db = init_test_db().await?;
        seed_known(&db).await;

        let server = test_server(db).await?;
        let response = server
            .patch(&format!("/api/v1/notes/{NOTE_ID}"))
            .json(&json!({
                "description": "two",
                "reminder": false,
            }))
            .await;

        assert_eq!(response.status_code(), 200);
        let note = response.json::<Note>();
        assert_eq!(note.title, "first");
        assert_eq!(note.description, "two");
        assert!(note.reminder);
        Ok(())
    }

    #[tokio::test]
    async fn update_with_empty_body() -> Result<()> {
        let db = init_test_db().await?;
        seed_known(&db).await;

        let server = test_server(db).await?;
        let response = server.put(&format!("/api/v1/notes/{NOTE_ID}")).json(&json!({})).await;

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>(), json!({ "error": "Missing details" }));
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_note() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;
        let response = server
            .patch(&format!("/api/v1/notes/{NOTE_ID}"))
            .json(&json!({ "title": "X" }))
            .await;

        assert_eq!(response.status_code(), 404);
        Ok(())
    }

    #[tokio::test]
    async fn delete_note() -> Result<()> {
        let db = init_test_db().await?;
        seed_known(&db).await;

        let server = test_server(db.clone()).await?;
        let response = server.delete(&format!("/api/v1/notes/{NOTE_ID}")).await;

        assert_eq!(response.status_code(), 200);
        let removed = response.json::<DeleteNoteResponse>();
        assert_eq!(removed.message, format!("Removed note with id: {NOTE_ID}"));
        assert_eq!(removed.note.title, "first");
        assert_eq!(count(&db).await, 0);

        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_note() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;
        let response = server.delete(&format!("/api/v1/notes/{NOTE_ID}")).await;

        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json::<Value>(), json!({ "error": "Not found." }));
        Ok(())
    }

    async fn test_server(db: DB) -> Result<TestServer> {
        crate::tests::test_server(Arc::new(SqliteNoteStore::new(db)), super::router).await
    }
}
