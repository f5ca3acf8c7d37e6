use crate::domain::{models::{lesson::Lesson, seat::Seat}, ports::LessonRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresLessonRepo {
    pool: PgPool,
}

impl PostgresLessonRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LessonRepository for PostgresLessonRepo {
    async fn create_with_seats(&self, lesson: &Lesson, seats: &[Seat]) -> Result<Lesson, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Lesson>(
            "INSERT INTO lessons (id, resort_id, title, starts_at, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *"
        )
            .bind(&lesson.id).bind(&lesson.resort_id).bind(&lesson.title)
            .bind(lesson.starts_at).bind(lesson.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for seat in seats {
            sqlx::query(
                "INSERT INTO seats (id, lesson_id, seat_number, status, claimed_mapping_id, claimed_at, version, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
            )
                .bind(&seat.id).bind(&seat.lesson_id).bind(seat.seat_number).bind(seat.status)
                .bind(&seat.claimed_mapping_id).bind(seat.claimed_at).bind(seat.version).bind(seat.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Lesson>, AppError> {
        sqlx::query_as::<_, Lesson>("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_seats(&self, lesson_id: &str) -> Result<Vec<Seat>, AppError> {
        sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE lesson_id = $1 ORDER BY seat_number ASC")
            .bind(lesson_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
