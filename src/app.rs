use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/sets", post(handlers::add_set_form))
        .route("/timer/start", post(handlers::timer_start_form))
        .route("/timer/stop", post(handlers::timer_stop_form))
        .route("/api/rows", get(handlers::get_rows))
        .route("/api/today", get(handlers::get_today))
        .route("/api/days/:date", get(handlers::get_day))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/sets", post(handlers::add_set))
        .route("/api/duration", post(handlers::record_duration))
        .route("/api/timer/start", post(handlers::timer_start))
        .route("/api/timer/stop", post(handlers::timer_stop))
        .with_state(state)
}
