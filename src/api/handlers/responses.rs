use axum::{extract::State, response::Html, Json};

use crate::api::{dashboard::render_dashboard, state::AppState};
use crate::services::StoreSnapshot;

/// GET /get_all_responses
pub async fn get_all_responses(State(state): State<AppState>) -> Json<StoreSnapshot> {
    Json(state.store.snapshot().await)
}

/// GET / -- human-facing view of the same snapshot
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.store.snapshot().await;
    Html(render_dashboard(state.roster(), &snapshot, &state.chains, None))
}
