use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Lesson {
    pub id: String,
    pub resort_id: String,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(resort_id: String, title: String, starts_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            resort_id,
            title,
            starts_at,
            created_at: Utc::now(),
        }
    }
}
