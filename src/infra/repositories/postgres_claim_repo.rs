use crate::domain::models::identity_form::FormStatus;
use crate::domain::models::seat::SeatStatus;
use crate::domain::models::student::{GlobalStudent, GuardianRelationship, StudentMapping};
use crate::domain::ports::{ClaimExecution, ClaimOutcome, ClaimRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresClaimRepo {
    pool: PgPool,
}

impl PostgresClaimRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClaimRepository for PostgresClaimRepo {
    async fn execute(&self, claim: &ClaimExecution) -> Result<ClaimOutcome, AppError> {
        let details = &claim.details;
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // 1. Resolve or create the global student, deduplicated by contact.
        let existing = sqlx::query_as::<_, GlobalStudent>(
            "SELECT * FROM global_students
             WHERE (email IS NOT NULL AND email = $1) OR (phone IS NOT NULL AND phone = $2)
             LIMIT 1"
        )
            .bind(&details.contact_email)
            .bind(&details.contact_phone)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let student = match existing {
            Some(student) => student,
            None => {
                let student = GlobalStudent::new(
                    details.student_name.clone(),
                    Some(details.contact_email.clone()),
                    details.contact_phone.clone(),
                    details.birth_date,
                );
                sqlx::query_as::<_, GlobalStudent>(
                    "INSERT INTO global_students (id, full_name, email, phone, birth_date, created_at)
                     VALUES ($1, $2, $3, $4, $5, $6)
                     RETURNING *"
                )
                    .bind(&student.id).bind(&student.full_name).bind(&student.email)
                    .bind(&student.phone).bind(student.birth_date).bind(student.created_at)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(AppError::Database)?
            }
        };

        // 2. Resort-scoped mapping; this is what the seat will reference.
        let mapping = StudentMapping::new(student.id.clone(), claim.resort_id.clone());
        sqlx::query(
            "INSERT INTO student_mappings (id, global_student_id, resort_id, created_at)
             VALUES ($1, $2, $3, $4)"
        )
            .bind(&mapping.id).bind(&mapping.global_student_id)
            .bind(&mapping.resort_id).bind(mapping.created_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        // 3. Version-guarded seat transition. A loser blocks on the row
        // lock until the winner commits, then matches zero rows; returning
        // here drops the transaction, rolling back steps 1 and 2.
        let result = sqlx::query(
            "UPDATE seats SET status = $1, claimed_mapping_id = $2, claimed_at = $3, version = version + 1
             WHERE id = $4 AND version = $5"
        )
            .bind(SeatStatus::Claimed)
            .bind(&mapping.id)
            .bind(claim.now)
            .bind(&claim.seat_id)
            .bind(claim.expected_version)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::SeatClaimed);
        }

        // 4. Consume the invitation through the code that carried this claim.
        sqlx::query("UPDATE invitations SET claimed_at = $1, claimed_by = $2 WHERE code = $3")
            .bind(claim.now)
            .bind(&mapping.id)
            .bind(&claim.code)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        // 5. Confirm the identity form; claim-time data wins over whatever
        // was submitted earlier.
        sqlx::query(
            "UPDATE identity_forms SET status = $1, confirmed_at = $2, student_name = $3, contact_email = $4, contact_phone = $5, birth_date = $6, is_minor = $7, has_liability_insurance = $8, has_accident_insurance = $9, note = $10
             WHERE seat_id = $11"
        )
            .bind(FormStatus::Confirmed)
            .bind(claim.now)
            .bind(&details.student_name)
            .bind(&details.contact_email)
            .bind(&details.contact_phone)
            .bind(details.birth_date)
            .bind(details.is_minor)
            .bind(details.has_liability_insurance)
            .bind(details.has_accident_insurance)
            .bind(&details.note)
            .bind(&claim.seat_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        // 6. Guardian relationship for minors, at most once per pair.
        if details.is_minor && let Some(guardian_email) = &details.guardian_email {
            let exists = sqlx::query(
                "SELECT id FROM guardian_relationships WHERE guardian_email = $1 AND global_student_id = $2"
            )
                .bind(guardian_email)
                .bind(&student.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            if exists.is_none() {
                let relationship = GuardianRelationship::new(
                    guardian_email.clone(),
                    student.id.clone(),
                    details.guardian_relationship.clone().unwrap_or_else(|| "guardian".to_string()),
                );
                sqlx::query(
                    "INSERT INTO guardian_relationships (id, guardian_email, global_student_id, relationship, created_at)
                     VALUES ($1, $2, $3, $4, $5)"
                )
                    .bind(&relationship.id).bind(&relationship.guardian_email)
                    .bind(&relationship.global_student_id).bind(&relationship.relationship)
                    .bind(relationship.created_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(AppError::Database)?;
            }
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(ClaimOutcome {
            seat_id: claim.seat_id.clone(),
            mapping_id: mapping.id,
        })
    }
}
