use crate::domain::models::{invitation::Invitation, lesson::Lesson, seat::Seat};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct LessonCreatedResponse {
    pub lesson: Lesson,
    pub seats: Vec<Seat>,
}

#[derive(Serialize)]
pub struct InvitationInfoResponse {
    pub code: String,
    pub seat_id: String,
    pub expires_at: DateTime<Utc>,
    pub is_expired: bool,
    pub is_claimed: bool,
}

impl InvitationInfoResponse {
    pub fn from_invitation(invitation: &Invitation, now: DateTime<Utc>) -> Self {
        Self {
            code: invitation.code.clone(),
            seat_id: invitation.seat_id.clone(),
            expires_at: invitation.expires_at,
            is_expired: invitation.is_expired(now),
            is_claimed: invitation.is_claimed(),
        }
    }
}

#[derive(Serialize)]
pub struct ClaimResponse {
    pub seat_id: String,
    pub mapping_id: String,
}
