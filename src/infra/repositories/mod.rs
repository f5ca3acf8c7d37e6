pub mod postgres_claim_repo;
pub mod postgres_identity_form_repo;
pub mod postgres_invitation_repo;
pub mod postgres_lesson_repo;
pub mod postgres_seat_repo;
pub mod sqlite_claim_repo;
pub mod sqlite_identity_form_repo;
pub mod sqlite_invitation_repo;
pub mod sqlite_lesson_repo;
pub mod sqlite_seat_repo;
