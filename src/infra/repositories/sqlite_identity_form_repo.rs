use crate::domain::{models::identity_form::IdentityForm, ports::IdentityFormRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteIdentityFormRepo {
    pool: SqlitePool,
}

impl SqliteIdentityFormRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityFormRepository for SqliteIdentityFormRepo {
    async fn find_by_seat(&self, seat_id: &str) -> Result<Option<IdentityForm>, AppError> {
        sqlx::query_as::<_, IdentityForm>("SELECT * FROM identity_forms WHERE seat_id = ?")
            .bind(seat_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn upsert(&self, form: &IdentityForm) -> Result<IdentityForm, AppError> {
        sqlx::query_as::<_, IdentityForm>(
            r#"INSERT INTO identity_forms (seat_id, status, student_name, contact_email, contact_phone, birth_date, is_minor, has_liability_insurance, has_accident_insurance, note, submitted_at, confirmed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(seat_id) DO UPDATE SET
               status=excluded.status,
               student_name=excluded.student_name,
               contact_email=excluded.contact_email,
               contact_phone=excluded.contact_phone,
               birth_date=excluded.birth_date,
               is_minor=excluded.is_minor,
               has_liability_insurance=excluded.has_liability_insurance,
               has_accident_insurance=excluded.has_accident_insurance,
               note=excluded.note,
               submitted_at=excluded.submitted_at
               RETURNING *"#
        )
            .bind(&form.seat_id)
            .bind(form.status)
            .bind(&form.student_name)
            .bind(&form.contact_email)
            .bind(&form.contact_phone)
            .bind(form.birth_date)
            .bind(form.is_minor)
            .bind(form.has_liability_insurance)
            .bind(form.has_accident_insurance)
            .bind(&form.note)
            .bind(form.submitted_at)
            .bind(form.confirmed_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
