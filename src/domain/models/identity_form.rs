use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// `confirmed` is terminal: it is only ever set inside a successful claim
/// transaction, and a confirmed form rejects further edits.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FormStatus {
    Draft,
    Submitted,
    Confirmed,
}

impl FormStatus {
    pub fn can_transition(self, next: FormStatus) -> bool {
        matches!(
            (self, next),
            (FormStatus::Draft, FormStatus::Submitted)
                | (FormStatus::Submitted, FormStatus::Submitted)
                | (FormStatus::Submitted, FormStatus::Confirmed)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct IdentityForm {
    pub seat_id: String,
    pub status: FormStatus,
    pub student_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub is_minor: bool,
    pub has_liability_insurance: bool,
    pub has_accident_insurance: bool,
    pub note: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl IdentityForm {
    pub fn submitted(seat_id: String, details: &ClaimantDetails, now: DateTime<Utc>) -> Self {
        Self {
            seat_id,
            status: FormStatus::Submitted,
            student_name: details.student_name.clone(),
            contact_email: details.contact_email.clone(),
            contact_phone: details.contact_phone.clone(),
            birth_date: details.birth_date,
            is_minor: details.is_minor,
            has_liability_insurance: details.has_liability_insurance,
            has_accident_insurance: details.has_accident_insurance,
            note: details.note.clone(),
            submitted_at: Some(now),
            confirmed_at: None,
        }
    }
}

/// Claimant data as supplied by the public flows. The same shape backs the
/// identity form upsert and the claim call; the guardian fields are only
/// acted on at claim time.
#[derive(Debug, Clone)]
pub struct ClaimantDetails {
    pub student_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub is_minor: bool,
    pub guardian_email: Option<String>,
    pub guardian_relationship: Option<String>,
    pub has_liability_insurance: bool,
    pub has_accident_insurance: bool,
    pub note: Option<String>,
}
