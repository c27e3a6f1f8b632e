use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::PersistedBooking;
use crate::services::availability::{compute_available_slots, reconcile_selection};
use crate::state::AppState;

// GET /api/availability
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub service_id: String,
    #[serde(default)]
    pub home_service: bool,
    pub selected_time: Option<String>,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    date: NaiveDate,
    duration_minutes: u32,
    slots: Vec<String>,
    selected_time: Option<String>,
}

pub async fn availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let service = state
        .catalog
        .service(&query.service_id)
        .ok_or_else(|| AppError::NotFound(format!("service {}", query.service_id)))?;
    let duration = service.duration_for(&state.catalog.home_service, query.home_service);

    let booked = state.repo.load_booked_intervals(query.date).await?;
    let slots = compute_available_slots(&booked, duration);
    let selected_time = reconcile_selection(&slots, query.selected_time.as_deref());

    Ok(Json(AvailabilityResponse {
        date: query.date,
        duration_minutes: duration,
        slots,
        selected_time,
    }))
}

// GET /api/bookings/lookup
#[derive(Deserialize)]
pub struct LookupQuery {
    pub name: String,
    pub phone: String,
}

pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Option<PersistedBooking>>, AppError> {
    let found = state.repo.find_existing_booking(&query.name, &query.phone)?;
    Ok(Json(found))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.repo.delete_booking(&id)? {
        Ok(Json(serde_json::json!({ "ok": true })))
    } else {
        Err(AppError::NotFound(format!("booking {id}")))
    }
}
