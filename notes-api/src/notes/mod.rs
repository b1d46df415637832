mod handlers;
mod model;
mod routes;
mod service;
mod store;

pub use model::*;
pub use store::{NoteStore, SqliteNoteStore};

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new().merge(routes::router(state))
}
