use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{requests::ClaimRequest, responses::ClaimResponse};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

pub async fn claim_seat(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(payload): Json<ClaimRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.claim_service.claim(&code, payload.into_details(), Utc::now()).await?;

    Ok(Json(ClaimResponse {
        seat_id: outcome.seat_id,
        mapping_id: outcome.mapping_id,
    }))
}
