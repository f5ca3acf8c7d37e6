use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::IdentityFormRequest;
use crate::domain::services::invitation_service::ClaimedCheck;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

pub async fn get_identity_form(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invitation = state.invitation_service.verify(&code, Utc::now(), ClaimedCheck::Skip).await?;

    let form = state.identity_service.get(&invitation.seat_id).await?
        .ok_or(AppError::NotFound("No identity form submitted for this seat".into()))?;

    Ok(Json(form))
}

// Claimed-check is skipped on purpose: a claimant may keep editing their
// form right up until the claim confirms it. The confirmed-form conflict
// inside the service guards the end state.
pub async fn submit_identity_form(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(payload): Json<IdentityFormRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invitation = state.invitation_service.verify(&code, Utc::now(), ClaimedCheck::Skip).await?;

    let seat = state.seat_repo.find_by_id(&invitation.seat_id).await?
        .ok_or(AppError::Internal)?;
    let lesson = state.lesson_repo.find_by_id(&seat.lesson_id).await?
        .ok_or(AppError::Internal)?;

    let details = payload.into_details();
    let form = state.identity_service
        .upsert(
            &format!("resort:{}", lesson.resort_id),
            &invitation.seat_id,
            &details,
            Utc::now(),
        )
        .await?;

    Ok(Json(form))
}
