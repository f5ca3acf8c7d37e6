use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One row per seat; regenerating an invitation rewrites `code` and
/// `expires_at` in place instead of inserting a second row.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Invitation {
    pub seat_id: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub claimed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(seat_id: String, code: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            seat_id,
            code,
            expires_at,
            claimed_at: None,
            claimed_by: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed_at.is_some()
    }
}
