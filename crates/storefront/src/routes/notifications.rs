//! Notification route handlers.

use axum::{Json, extract::State};

use crate::notifications::Notice;
use crate::state::AppState;

/// Return and clear every pending notice.
pub async fn drain(State(state): State<AppState>) -> Json<Vec<Notice>> {
    Json(state.store().await.drain_notices())
}
