use crate::domain::{models::seat::{Seat, SeatChange}, ports::SeatRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresSeatRepo {
    pool: PgPool,
}

impl PostgresSeatRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatRepository for PostgresSeatRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Seat>, AppError> {
        sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE id = $1")
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
            "UPDATE seats SET status = $1, claimed_mapping_id = $2, claimed_at = $3, version = version + 1
             WHERE id = $4 AND version = $5"
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
