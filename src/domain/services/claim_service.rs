use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::models::identity_form::ClaimantDetails;
use crate::domain::models::seat::SeatStatus;
use crate::domain::ports::{
    AuditEvent, AuditSink, ClaimExecution, ClaimOutcome, ClaimRepository, IdentityFormRepository,
    LessonRepository, SeatRepository,
};
use crate::domain::services::identity_service::{validate_required_fields, IdentityFormService};
use crate::domain::services::invitation_service::{ClaimedCheck, InvitationService};
use crate::error::AppError;

/// Orchestrates a claim: read-only pre-checks first, then one transaction
/// that either applies every write or none of them.
pub struct ClaimService {
    invitations: Arc<InvitationService>,
    seat_repo: Arc<dyn SeatRepository>,
    lesson_repo: Arc<dyn LessonRepository>,
    form_repo: Arc<dyn IdentityFormRepository>,
    claim_repo: Arc<dyn ClaimRepository>,
    audit: Arc<dyn AuditSink>,
}

impl ClaimService {
    pub fn new(
        invitations: Arc<InvitationService>,
        seat_repo: Arc<dyn SeatRepository>,
        lesson_repo: Arc<dyn LessonRepository>,
        form_repo: Arc<dyn IdentityFormRepository>,
        claim_repo: Arc<dyn ClaimRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            invitations,
            seat_repo,
            lesson_repo,
            form_repo,
            claim_repo,
            audit,
        }
    }

    pub async fn claim(
        &self,
        code: &str,
        details: ClaimantDetails,
        now: DateTime<Utc>,
    ) -> Result<ClaimOutcome, AppError> {
        validate_required_fields(&details)?;

        let invitation = self.invitations.verify(code, now, ClaimedCheck::Enforce).await?;

        let seat = self
            .seat_repo
            .find_by_id(&invitation.seat_id)
            .await?
            .ok_or(AppError::NotFound("Seat not found".into()))?;

        if seat.status == SeatStatus::Claimed {
            return Err(AppError::SeatClaimed);
        }
        if !seat.status.can_transition(SeatStatus::Claimed) {
            return Err(AppError::Conflict(
                "Seat is not open for claiming".to_string(),
            ));
        }

        let form = self.form_repo.find_by_seat(&seat.id).await?;
        IdentityFormService::ensure_claimable(form.as_ref())?;

        let lesson = self
            .lesson_repo
            .find_by_id(&seat.lesson_id)
            .await?
            .ok_or(AppError::InternalWithMsg(format!(
                "seat {} references missing lesson {}",
                seat.id, seat.lesson_id
            )))?;

        let execution = ClaimExecution {
            seat_id: seat.id.clone(),
            expected_version: seat.version,
            code: code.to_string(),
            resort_id: lesson.resort_id.clone(),
            details,
            now,
        };

        let outcome = self.claim_repo.execute(&execution).await?;

        info!(
            "Seat {} claimed via code {} (mapping {})",
            outcome.seat_id, code, outcome.mapping_id
        );
        self.audit
            .record(AuditEvent::new(
                &execution.details.contact_email,
                "seat.claimed",
                "seat",
                &outcome.seat_id,
                &format!("resort:{}", lesson.resort_id),
            ))
            .await;

        Ok(outcome)
    }
}
