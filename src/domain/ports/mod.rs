use crate::domain::models::{
    identity_form::{ClaimantDetails, IdentityForm},
    invitation::Invitation,
    lesson::Lesson,
    seat::{Seat, SeatChange},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Creates the lesson together with its seats in one transaction.
    async fn create_with_seats(&self, lesson: &Lesson, seats: &[Seat]) -> Result<Lesson, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Lesson>, AppError>;
    async fn list_seats(&self, lesson_id: &str) -> Result<Vec<Seat>, AppError>;
}

#[async_trait]
pub trait SeatRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Seat>, AppError>;
    /// Version-guarded update: `WHERE id = ? AND version = ?`, bumping the
    /// version in the same statement. Returns false when zero rows matched,
    /// meaning another writer advanced the seat first.
    async fn cas_update(
        &self,
        seat_id: &str,
        expected_version: i64,
        change: &SeatChange,
    ) -> Result<bool, AppError>;
}

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Invitation>, AppError>;
    async fn find_by_seat(&self, seat_id: &str) -> Result<Option<Invitation>, AppError>;
    /// Fails with a unique violation when the code is already taken; the
    /// invitation service owns the bounded retry.
    async fn create(&self, invitation: &Invitation) -> Result<Invitation, AppError>;
    /// Rewrites code and expiry on the seat's existing row.
    async fn refresh(
        &self,
        seat_id: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, AppError>;
}

#[async_trait]
pub trait IdentityFormRepository: Send + Sync {
    async fn find_by_seat(&self, seat_id: &str) -> Result<Option<IdentityForm>, AppError>;
    async fn upsert(&self, form: &IdentityForm) -> Result<IdentityForm, AppError>;
}

/// Everything the claim transaction needs, resolved by the pre-checks
/// before the transaction opens. `expected_version` is the seat version
/// observed at that point; the CAS inside the transaction is the final
/// arbiter.
#[derive(Debug, Clone)]
pub struct ClaimExecution {
    pub seat_id: String,
    pub expected_version: i64,
    pub code: String,
    pub resort_id: String,
    pub details: ClaimantDetails,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub seat_id: String,
    pub mapping_id: String,
}

#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Runs the whole claim as one transaction: resolve-or-create the
    /// global student, create the resort mapping, CAS the seat to claimed,
    /// stamp the invitation, confirm the identity form, and optionally
    /// record the guardian relationship. A CAS loss rolls back every prior
    /// step and surfaces as `AppError::SeatClaimed`.
    async fn execute(&self, claim: &ClaimExecution) -> Result<ClaimOutcome, AppError>;
}

#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub actor: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub scope: String,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(actor: &str, action: &str, entity_type: &str, entity_id: &str, scope: &str) -> Self {
        Self {
            actor: actor.to_string(),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            scope: scope.to_string(),
            at: Utc::now(),
        }
    }
}

/// Write-only sink. Recording must never fail the calling flow; impls log
/// their own delivery problems.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}
