use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/select", post(handlers::select_form))
        .route("/api/countries", get(handlers::get_countries))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/select", post(handlers::select))
        .route("/api/retry", post(handlers::retry))
        .with_state(state)
}
