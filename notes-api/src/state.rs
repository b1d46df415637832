use std::sync::Arc;

use axum_macros::FromRef;

use crate::notes::NoteStore;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteStore>,
}
