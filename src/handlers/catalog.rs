use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Decant, DecantFamily, HomeServiceAddon, Service};
use crate::state::AppState;

// GET /api/services
#[derive(Serialize)]
pub struct ServicesResponse {
    services: Vec<Service>,
    home_service: HomeServiceAddon,
}

pub async fn list_services(State(state): State<Arc<AppState>>) -> Json<ServicesResponse> {
    Json(ServicesResponse {
        services: state.catalog.services.clone(),
        home_service: state.catalog.home_service,
    })
}

// GET /api/decants
#[derive(Deserialize)]
pub struct DecantsQuery {
    pub family: Option<String>,
    pub q: Option<String>,
}

pub async fn list_decants(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DecantsQuery>,
) -> Result<Json<Vec<Decant>>, AppError> {
    let family = match query.family.as_deref().filter(|f| !f.is_empty()) {
        Some(raw) => Some(
            DecantFamily::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown family: {raw}")))?,
        ),
        None => None,
    };

    let decants = state
        .catalog
        .filter_decants(family, query.q.as_deref())
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(decants))
}
