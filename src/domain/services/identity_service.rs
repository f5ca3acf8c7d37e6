use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::models::identity_form::{ClaimantDetails, FormStatus, IdentityForm};
use crate::domain::ports::{AuditEvent, AuditSink, IdentityFormRepository};
use crate::error::AppError;

pub struct IdentityFormService {
    form_repo: Arc<dyn IdentityFormRepository>,
    audit: Arc<dyn AuditSink>,
}

impl IdentityFormService {
    pub fn new(form_repo: Arc<dyn IdentityFormRepository>, audit: Arc<dyn AuditSink>) -> Self {
        Self { form_repo, audit }
    }

    pub async fn get(&self, seat_id: &str) -> Result<Option<IdentityForm>, AppError> {
        self.form_repo.find_by_seat(seat_id).await
    }

    /// Writes (or rewrites) the claimant's form, always landing on
    /// `submitted` with a fresh timestamp. A confirmed form means the seat
    /// was already claimed through it, so further edits are a conflict.
    pub async fn upsert(
        &self,
        resort_scope: &str,
        seat_id: &str,
        details: &ClaimantDetails,
        now: DateTime<Utc>,
    ) -> Result<IdentityForm, AppError> {
        validate_required_fields(details)?;

        if let Some(existing) = self.form_repo.find_by_seat(seat_id).await?
            && !existing.status.can_transition(FormStatus::Submitted)
        {
            return Err(AppError::Conflict(
                "Identity form is already confirmed".to_string(),
            ));
        }

        let form = IdentityForm::submitted(seat_id.to_string(), details, now);
        let saved = self.form_repo.upsert(&form).await?;

        info!("Identity form submitted for seat {}", seat_id);
        self.audit
            .record(AuditEvent::new(
                &details.contact_email,
                "identity.submitted",
                "identity_form",
                seat_id,
                resort_scope,
            ))
            .await;
        Ok(saved)
    }

    /// Claim-time precondition, stricter than the upsert-time validation:
    /// the form must exist and have progressed past draft.
    pub fn ensure_claimable(form: Option<&IdentityForm>) -> Result<(), AppError> {
        match form {
            None => Err(AppError::IdentityFormIncomplete(
                "no identity form submitted for this seat".to_string(),
            )),
            Some(f) if f.status == FormStatus::Draft => Err(AppError::IdentityFormIncomplete(
                "identity form has not been submitted".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}

pub fn validate_required_fields(details: &ClaimantDetails) -> Result<(), AppError> {
    if details.student_name.trim().is_empty() {
        return Err(AppError::IdentityFormIncomplete(
            "student name is required".to_string(),
        ));
    }
    let email = details.contact_email.trim();
    if email.is_empty() {
        return Err(AppError::IdentityFormIncomplete(
            "contact email is required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::IdentityFormIncomplete(
            "contact email is not valid".to_string(),
        ));
    }
    Ok(())
}
