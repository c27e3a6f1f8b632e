use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::PersistedBooking;
use crate::services::conflict::{ConflictOutcome, Resolution};
use crate::services::drafts::{DraftPatch, DraftView};
use crate::services::notify::{compose_message, email_link, whatsapp_link};
use crate::state::AppState;

// POST /api/drafts
#[derive(Deserialize)]
pub struct CreateDraftRequest {
    pub service_id: String,
}

pub async fn create_draft(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<DraftView>), AppError> {
    let view = state.drafts.create(&body.service_id)?;
    Ok((StatusCode::CREATED, Json(view)))
}

// GET /api/drafts/:id
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DraftView>, AppError> {
    Ok(Json(state.drafts.get(id)?))
}

// PATCH /api/drafts/:id
pub async fn patch_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<DraftPatch>,
) -> Result<Json<DraftView>, AppError> {
    Ok(Json(state.drafts.patch(id, patch).await?))
}

// POST /api/drafts/:id/conflict
#[derive(Deserialize)]
pub struct ResolveRequest {
    pub choice: Resolution,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    draft: DraftView,
    outcome: ConflictOutcome,
    message: String,
}

pub async fn resolve_conflict(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, AppError> {
    let (draft, outcome) = state.drafts.resolve(id, body.choice).await?;
    let message = outcome.message();
    Ok(Json(ResolveResponse {
        draft,
        outcome,
        message,
    }))
}

// POST /api/drafts/:id/submit
#[derive(Serialize)]
pub struct ConfirmationResponse {
    booking: PersistedBooking,
    message: String,
    whatsapp_url: Option<String>,
    email_url: Option<String>,
    calendar_url: String,
}

pub async fn submit_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ConfirmationResponse>), AppError> {
    let today = chrono::Local::now().date_naive();
    let submitted = state.drafts.submit(id, today).await?;

    let message = compose_message(&submitted.summary);
    let whatsapp_url = whatsapp_link(&state.config.business_whatsapp, &message)
        .map_err(|e| tracing::debug!(error = %e, "skipping WhatsApp link"))
        .ok()
        .map(|u| u.to_string());
    let subject = format!("Booking: {}", submitted.summary.service_name);
    let email_url = email_link(&state.config.business_email, &subject, &message)
        .map_err(|e| tracing::debug!(error = %e, "skipping email link"))
        .ok()
        .map(|u| u.to_string());
    let calendar_url = format!("/calendar/{}.ics", submitted.booking.id);

    Ok((
        StatusCode::CREATED,
        Json(ConfirmationResponse {
            booking: submitted.booking,
            message,
            whatsapp_url,
            email_url,
            calendar_url,
        }),
    ))
}
