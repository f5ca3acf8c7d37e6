use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Seat lifecycle only ever moves forward. Any transition not listed in
/// `can_transition` is rejected before a statement is issued.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SeatStatus {
    Pending,
    Invited,
    Claimed,
}

impl SeatStatus {
    pub fn can_transition(self, next: SeatStatus) -> bool {
        matches!(
            (self, next),
            (SeatStatus::Pending, SeatStatus::Invited) | (SeatStatus::Invited, SeatStatus::Claimed)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Seat {
    pub id: String,
    pub lesson_id: String,
    pub seat_number: i32,
    pub status: SeatStatus,
    pub claimed_mapping_id: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Seat {
    pub fn new(lesson_id: String, seat_number: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            lesson_id,
            seat_number,
            status: SeatStatus::Pending,
            claimed_mapping_id: None,
            claimed_at: None,
            version: 0,
            created_at: Utc::now(),
        }
    }
}

/// Fields applied by a version-guarded seat update.
#[derive(Debug, Clone)]
pub struct SeatChange {
    pub status: SeatStatus,
    pub claimed_mapping_id: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl SeatChange {
    pub fn invited() -> Self {
        Self {
            status: SeatStatus::Invited,
            claimed_mapping_id: None,
            claimed_at: None,
        }
    }
}
