use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AuthStaff, resort::ResortId};
use crate::api::dtos::{requests::IssueInvitationRequest, responses::InvitationInfoResponse};
use crate::domain::services::invitation_service::{ClaimedCheck, DEFAULT_TTL_DAYS};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

pub async fn issue_invitation(
    State(state): State<Arc<AppState>>,
    ResortId(resort_id): ResortId,
    AuthStaff(staff): AuthStaff,
    Path((_, seat_id)): Path<(String, String)>,
    Json(payload): Json<IssueInvitationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let seat = state.seat_repo.find_by_id(&seat_id).await?
        .ok_or(AppError::NotFound("Seat not found".into()))?;

    let lesson = state.lesson_repo.find_by_id(&seat.lesson_id).await?
        .ok_or(AppError::Internal)?;

    if lesson.resort_id != resort_id {
        return Err(AppError::NotFound("Seat not found".into()));
    }

    let ttl_days = payload.ttl_days.unwrap_or(DEFAULT_TTL_DAYS);
    if !(1..=365).contains(&ttl_days) {
        return Err(AppError::Validation("ttl_days must be between 1 and 365".into()));
    }

    let invitation = state.invitation_service.issue(&staff.sub, &resort_id, &seat, ttl_days).await?;

    info!("Invitation ready for seat {}", seat_id);
    Ok(Json(invitation))
}

pub async fn verify_invitation(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let invitation = state.invitation_service.verify(&code, now, ClaimedCheck::Enforce).await?;

    Ok(Json(InvitationInfoResponse::from_invitation(&invitation, now)))
}
