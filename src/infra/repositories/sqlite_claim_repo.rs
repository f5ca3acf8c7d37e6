use crate::domain::models::identity_form::FormStatus;
use crate::domain::models::seat::SeatStatus;
use crate::domain::models::student::{GlobalStudent, GuardianRelationship, StudentMapping};
use crate::domain::ports::{ClaimExecution, ClaimOutcome, ClaimRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteClaimRepo {
    pool: SqlitePool,
}

impl SqliteClaimRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClaimRepository for SqliteClaimRepo {
    async fn execute(&self, claim: &ClaimExecution) -> Result<ClaimOutcome, AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;

        // BEGIN IMMEDIATE: take the write lock up front so racing claims
        // serialize here and lose cleanly on the version check, rather than
        // failing mid-transaction on a stale read snapshot.
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(AppError::Database)?;

        match run_claim(&mut conn, claim).await {
            Ok(outcome) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(AppError::Database)?;
                Ok(outcome)
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }
}

async fn run_claim(
    conn: &mut SqliteConnection,
    claim: &ClaimExecution,
) -> Result<ClaimOutcome, AppError> {
    let details = &claim.details;

    // 1. Resolve or create the global student, deduplicated by contact.
    let existing = sqlx::query_as::<_, GlobalStudent>(
        "SELECT * FROM global_students
         WHERE (email IS NOT NULL AND email = ?) OR (phone IS NOT NULL AND phone = ?)
         LIMIT 1"
    )
        .bind(&details.contact_email)
        .bind(&details.contact_phone)
        .fetch_optional(&mut *conn)
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
                 VALUES (?, ?, ?, ?, ?, ?)
                 RETURNING *"
            )
                .bind(&student.id).bind(&student.full_name).bind(&student.email)
                .bind(&student.phone).bind(student.birth_date).bind(student.created_at)
                .fetch_one(&mut *conn)
                .await
                .map_err(AppError::Database)?
        }
    };

    // 2. Resort-scoped mapping; this is what the seat will reference.
    let mapping = StudentMapping::new(student.id.clone(), claim.resort_id.clone());
    sqlx::query(
        "INSERT INTO student_mappings (id, global_student_id, resort_id, created_at)
         VALUES (?, ?, ?, ?)"
    )
        .bind(&mapping.id).bind(&mapping.global_student_id)
        .bind(&mapping.resort_id).bind(mapping.created_at)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    // 3. Version-guarded seat transition. Zero rows affected means another
    // claim advanced the seat first; everything above rolls back with us.
    let result = sqlx::query(
        "UPDATE seats SET status = ?, claimed_mapping_id = ?, claimed_at = ?, version = version + 1
         WHERE id = ? AND version = ?"
    )
        .bind(SeatStatus::Claimed)
        .bind(&mapping.id)
        .bind(claim.now)
        .bind(&claim.seat_id)
        .bind(claim.expected_version)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    if result.rows_affected() == 0 {
        return Err(AppError::SeatClaimed);
    }

    // 4. Consume the invitation through the code that carried this claim.
    sqlx::query("UPDATE invitations SET claimed_at = ?, claimed_by = ? WHERE code = ?")
        .bind(claim.now)
        .bind(&mapping.id)
        .bind(&claim.code)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    // 5. Confirm the identity form; claim-time data wins over whatever was
    // submitted earlier.
    sqlx::query(
        "UPDATE identity_forms SET status = ?, confirmed_at = ?, student_name = ?, contact_email = ?, contact_phone = ?, birth_date = ?, is_minor = ?, has_liability_insurance = ?, has_accident_insurance = ?, note = ?
         WHERE seat_id = ?"
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
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    // 6. Guardian relationship for minors, at most once per pair.
    if details.is_minor && let Some(guardian_email) = &details.guardian_email {
        let exists = sqlx::query(
            "SELECT id FROM guardian_relationships WHERE guardian_email = ? AND global_student_id = ?"
        )
            .bind(guardian_email)
            .bind(&student.id)
            .fetch_optional(&mut *conn)
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
                 VALUES (?, ?, ?, ?, ?)"
            )
                .bind(&relationship.id).bind(&relationship.guardian_email)
                .bind(&relationship.global_student_id).bind(&relationship.relationship)
                .bind(relationship.created_at)
                .execute(&mut *conn)
                .await
                .map_err(AppError::Database)?;
        }
    }

    Ok(ClaimOutcome {
        seat_id: claim.seat_id.clone(),
        mapping_id: mapping.id,
    })
}
