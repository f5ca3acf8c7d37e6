use crate::domain::models::identity_form::ClaimantDetails;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub seat_count: i32,
}

#[derive(Deserialize)]
pub struct IssueInvitationRequest {
    pub ttl_days: Option<i64>,
}

#[derive(Deserialize)]
pub struct IdentityFormRequest {
    pub student_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub is_minor: Option<bool>,
    pub has_liability_insurance: Option<bool>,
    pub has_accident_insurance: Option<bool>,
    pub note: Option<String>,
}

impl IdentityFormRequest {
    pub fn into_details(self) -> ClaimantDetails {
        ClaimantDetails {
            student_name: self.student_name,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            birth_date: self.birth_date,
            is_minor: self.is_minor.unwrap_or(false),
            guardian_email: None,
            guardian_relationship: None,
            has_liability_insurance: self.has_liability_insurance.unwrap_or(false),
            has_accident_insurance: self.has_accident_insurance.unwrap_or(false),
            note: self.note,
        }
    }
}

#[derive(Deserialize)]
pub struct ClaimRequest {
    pub student_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub is_minor: Option<bool>,
    pub guardian_email: Option<String>,
    pub guardian_relationship: Option<String>,
    pub has_liability_insurance: Option<bool>,
    pub has_accident_insurance: Option<bool>,
    pub note: Option<String>,
}

impl ClaimRequest {
    pub fn into_details(self) -> ClaimantDetails {
        ClaimantDetails {
            student_name: self.student_name,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            birth_date: self.birth_date,
            is_minor: self.is_minor.unwrap_or(false),
            guardian_email: self.guardian_email,
            guardian_relationship: self.guardian_relationship,
            has_liability_insurance: self.has_liability_insurance.unwrap_or(false),
            has_accident_insurance: self.has_accident_insurance.unwrap_or(false),
            note: self.note,
        }
    }
}
