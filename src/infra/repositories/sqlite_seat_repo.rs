use crate::domain::{models::seat::{Seat, SeatChange}, ports::SeatRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSeatRepo {
    pool: SqlitePool,
}

impl SqliteSeatRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatRepository for SqliteSeatRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Seat>, AppError> {
        sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn cas_update(
        &self,
        seat_id: &str,
        expected_version: i64,
        change: &SeatChange,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE seats SET status = ?, claimed_mapping_id = ?, claimed_at = ?, version = version + 1
             WHERE id = ? AND version = ?"
        )
            .bind(change.status)
            .bind(&change.claimed_mapping_id)
            .bind(change.claimed_at)
            .bind(seat_id)
            .bind(expected_version)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
