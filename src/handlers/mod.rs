pub mod booking;
pub mod calendar;
pub mod catalog;
pub mod drafts;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/services", get(catalog::list_services))
        .route("/api/decants", get(catalog::list_decants))
        .route("/api/availability", get(booking::availability))
        .route("/api/bookings/lookup", get(booking::lookup))
        .route("/api/bookings/:id", axum::routing::delete(booking::delete_booking))
        .route("/api/drafts", post(drafts::create_draft))
        .route(
            "/api/drafts/:id",
            get(drafts::get_draft).patch(drafts::patch_draft),
        )
        .route("/api/drafts/:id/conflict", post(drafts::resolve_conflict))
        .route("/api/drafts/:id/submit", post(drafts::submit_draft))
        .route("/calendar/:booking_id", get(calendar::download_ics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
