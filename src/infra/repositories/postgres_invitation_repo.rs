use crate::domain::{models::invitation::Invitation, ports::InvitationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresInvitationRepo {
    pool: PgPool,
}

impl PostgresInvitationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepo {
    async fn find_by_code(&self, code: &str) -> Result<Option<Invitation>, AppError> {
        sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_seat(&self, seat_id: &str) -> Result<Option<Invitation>, AppError> {
        sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE seat_id = $1")
            .bind(seat_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn create(&self, invitation: &Invitation) -> Result<Invitation, AppError> {
        sqlx::query_as::<_, Invitation>(
            "INSERT INTO invitations (seat_id, code, expires_at, claimed_at, claimed_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *"
        )
            .bind(&invitation.seat_id).bind(&invitation.code).bind(invitation.expires_at)
            .bind(invitation.claimed_at).bind(&invitation.claimed_by).bind(invitation.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn refresh(
        &self,
        seat_id: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        sqlx::query_as::<_, Invitation>(
            "UPDATE invitations SET code = $1, expires_at = $2
             WHERE seat_id = $3
             RETURNING *"
        )
            .bind(code)
            .bind(expires_at)
            .bind(seat_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Invitation not found".into()))
    }
}
