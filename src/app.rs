use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/chart", get(handlers::chart_page))
        .route("/entries", post(handlers::submit_form))
        .route("/api/entries", get(handlers::list_entries).post(handlers::save_entry))
        .route("/api/chart/data", get(handlers::chart_data))
        .with_state(state)
}
