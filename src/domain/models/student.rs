use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// A person deduplicated across the whole system by contact email or phone.
/// Seats and lesson records never reference this directly; they reference a
/// resort-scoped StudentMapping.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GlobalStudent {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl GlobalStudent {
    pub fn new(
        full_name: String,
        email: Option<String>,
        phone: Option<String>,
        birth_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            full_name,
            email,
            phone,
            birth_date,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct StudentMapping {
    pub id: String,
    pub global_student_id: String,
    pub resort_id: String,
    pub created_at: DateTime<Utc>,
}

impl StudentMapping {
    pub fn new(global_student_id: String, resort_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            global_student_id,
            resort_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GuardianRelationship {
    pub id: String,
    pub guardian_email: String,
    pub global_student_id: String,
    pub relationship: String,
    pub created_at: DateTime<Utc>,
}

impl GuardianRelationship {
    pub fn new(guardian_email: String, global_student_id: String, relationship: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            guardian_email,
            global_student_id,
            relationship,
            created_at: Utc::now(),
        }
    }
}
