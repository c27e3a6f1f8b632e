use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::services::calendar::generate_ics;
use crate::state::AppState;

pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    // Strip .ics suffix if present
    let booking_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let booking = match state.repo.find_by_id(booking_id) {
        Ok(Some(b)) => b,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, "Booking not found").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load booking for .ics");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };

    let ics = match generate_ics(&booking, &state.config.business_name) {
        Ok(ics) => ics,
        Err(e) => {
            tracing::error!(id = %booking.id, error = %e, "failed to render .ics");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };
    let filename = format!("booking-{booking_id}.ics");

    (
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response()
}
