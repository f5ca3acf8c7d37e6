use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::domain::models::invitation::Invitation;
use crate::domain::models::seat::{Seat, SeatChange, SeatStatus};
use crate::domain::ports::{AuditEvent, AuditSink, InvitationRepository, SeatRepository};
use crate::domain::services::code_generator::{generate_code, INVITE_CODE_ALPHABET, INVITE_CODE_LENGTH};
use crate::error::{is_unique_violation, AppError};

pub const DEFAULT_TTL_DAYS: i64 = 7;

/// Code collisions are retried locally; anything past this bound is
/// surfaced as INVITE_CODE_COLLISION instead of looping.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Whether `verify` should reject an already-claimed code. The claim flow
/// enforces it; the identity-form flow skips it so a claimant can keep
/// editing their draft, with the confirmed-form check guarding the end
/// state instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimedCheck {
    Enforce,
    Skip,
}

pub struct InvitationService {
    invitation_repo: Arc<dyn InvitationRepository>,
    seat_repo: Arc<dyn SeatRepository>,
    audit: Arc<dyn AuditSink>,
}

impl InvitationService {
    pub fn new(
        invitation_repo: Arc<dyn InvitationRepository>,
        seat_repo: Arc<dyn SeatRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            invitation_repo,
            seat_repo,
            audit,
        }
    }

    /// Issues a fresh invitation for the seat, or regenerates the existing
    /// one in place (same row, new code and expiry). The previous code
    /// stops working the moment the row is rewritten.
    pub async fn issue(
        &self,
        actor: &str,
        resort_id: &str,
        seat: &Seat,
        ttl_days: i64,
    ) -> Result<Invitation, AppError> {
        let expires_at = Utc::now() + Duration::days(ttl_days);

        if let Some(existing) = self.invitation_repo.find_by_seat(&seat.id).await? {
            if existing.is_claimed() {
                return Err(AppError::InviteAlreadyClaimed);
            }

            let refreshed = self.refresh_with_retry(&seat.id, expires_at).await?;
            info!("Regenerated invitation for seat {}", seat.id);
            self.audit
                .record(AuditEvent::new(
                    actor,
                    "invitation.refreshed",
                    "seat",
                    &seat.id,
                    &format!("resort:{}", resort_id),
                ))
                .await;
            return Ok(refreshed);
        }

        let created = self.create_with_retry(&seat.id, expires_at).await?;

        if seat.status == SeatStatus::Pending {
            let moved = self
                .seat_repo
                .cas_update(&seat.id, seat.version, &SeatChange::invited())
                .await?;
            if !moved {
                return Err(AppError::Conflict(
                    "Seat was modified by another request".to_string(),
                ));
            }
        }

        info!("Issued invitation for seat {}", seat.id);
        self.audit
            .record(AuditEvent::new(
                actor,
                "invitation.issued",
                "seat",
                &seat.id,
                &format!("resort:{}", resort_id),
            ))
            .await;
        Ok(created)
    }

    /// Validates a code against time and claim state. Expiry is checked
    /// before claim state on purpose: an expired-and-unclaimed code must
    /// report expiry, not look claimable.
    pub async fn verify(
        &self,
        code: &str,
        now: DateTime<Utc>,
        check: ClaimedCheck,
    ) -> Result<Invitation, AppError> {
        let invitation = self
            .invitation_repo
            .find_by_code(code)
            .await?
            .ok_or(AppError::InviteNotFound)?;

        if invitation.is_expired(now) {
            return Err(AppError::InviteExpired);
        }
        if check == ClaimedCheck::Enforce && invitation.is_claimed() {
            return Err(AppError::InviteAlreadyClaimed);
        }

        Ok(invitation)
    }

    async fn create_with_retry(
        &self,
        seat_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code(INVITE_CODE_LENGTH, INVITE_CODE_ALPHABET);
            let invitation = Invitation::new(seat_id.to_string(), code, expires_at);

            match self.invitation_repo.create(&invitation).await {
                Ok(created) => return Ok(created),
                Err(AppError::Database(e)) if is_unique_violation(&e) => {
                    warn!("Invitation code collision for seat {} (attempt {})", seat_id, attempt);
                }
                Err(e) => return Err(e),
            }
        }
        Err(AppError::InviteCodeCollision)
    }

    async fn refresh_with_retry(
        &self,
        seat_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code(INVITE_CODE_LENGTH, INVITE_CODE_ALPHABET);

            match self.invitation_repo.refresh(seat_id, &code, expires_at).await {
                Ok(refreshed) => return Ok(refreshed),
                Err(AppError::Database(e)) if is_unique_violation(&e) => {
                    warn!("Invitation code collision for seat {} (attempt {})", seat_id, attempt);
                }
                Err(e) => return Err(e),
            }
        }
        Err(AppError::InviteCodeCollision)
    }
}
