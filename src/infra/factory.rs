use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{
    AuditSink, ClaimRepository, IdentityFormRepository, InvitationRepository,
    LessonRepository, SeatRepository,
};
use crate::domain::services::claim_service::ClaimService;
use crate::domain::services::identity_service::IdentityFormService;
use crate::domain::services::invitation_service::InvitationService;
use crate::infra::audit::http_audit_sink::HttpAuditSink;
use crate::infra::repositories::{
    postgres_claim_repo::PostgresClaimRepo, postgres_identity_form_repo::PostgresIdentityFormRepo,
    postgres_invitation_repo::PostgresInvitationRepo, postgres_lesson_repo::PostgresLessonRepo,
    postgres_seat_repo::PostgresSeatRepo,
    sqlite_claim_repo::SqliteClaimRepo, sqlite_identity_form_repo::SqliteIdentityFormRepo,
    sqlite_invitation_repo::SqliteInvitationRepo, sqlite_lesson_repo::SqliteLessonRepo,
    sqlite_seat_repo::SqliteSeatRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let audit_sink: Arc<dyn AuditSink> = Arc::new(HttpAuditSink::new(
        config.audit_sink_url.clone(),
        config.audit_sink_token.clone(),
    ));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let lesson_repo: Arc<dyn LessonRepository> = Arc::new(PostgresLessonRepo::new(pool.clone()));
        let seat_repo: Arc<dyn SeatRepository> = Arc::new(PostgresSeatRepo::new(pool.clone()));
        let invitation_repo: Arc<dyn InvitationRepository> = Arc::new(PostgresInvitationRepo::new(pool.clone()));
        let identity_form_repo: Arc<dyn IdentityFormRepository> = Arc::new(PostgresIdentityFormRepo::new(pool.clone()));
        let claim_repo: Arc<dyn ClaimRepository> = Arc::new(PostgresClaimRepo::new(pool.clone()));

        assemble_state(config, lesson_repo, seat_repo, invitation_repo, identity_form_repo, claim_repo, audit_sink)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let lesson_repo: Arc<dyn LessonRepository> = Arc::new(SqliteLessonRepo::new(pool.clone()));
        let seat_repo: Arc<dyn SeatRepository> = Arc::new(SqliteSeatRepo::new(pool.clone()));
        let invitation_repo: Arc<dyn InvitationRepository> = Arc::new(SqliteInvitationRepo::new(pool.clone()));
        let identity_form_repo: Arc<dyn IdentityFormRepository> = Arc::new(SqliteIdentityFormRepo::new(pool.clone()));
        let claim_repo: Arc<dyn ClaimRepository> = Arc::new(SqliteClaimRepo::new(pool.clone()));

        assemble_state(config, lesson_repo, seat_repo, invitation_repo, identity_form_repo, claim_repo, audit_sink)
    }
}

fn assemble_state(
    config: &Config,
    lesson_repo: Arc<dyn LessonRepository>,
    seat_repo: Arc<dyn SeatRepository>,
    invitation_repo: Arc<dyn InvitationRepository>,
    identity_form_repo: Arc<dyn IdentityFormRepository>,
    claim_repo: Arc<dyn ClaimRepository>,
    audit_sink: Arc<dyn AuditSink>,
) -> AppState {
    let invitation_service = Arc::new(InvitationService::new(
        invitation_repo.clone(),
        seat_repo.clone(),
        audit_sink.clone(),
    ));
    let identity_service = Arc::new(IdentityFormService::new(
        identity_form_repo.clone(),
        audit_sink.clone(),
    ));
    let claim_service = Arc::new(ClaimService::new(
        invitation_service.clone(),
        seat_repo.clone(),
        lesson_repo.clone(),
        identity_form_repo.clone(),
        claim_repo.clone(),
        audit_sink.clone(),
    ));

    AppState {
        config: config.clone(),
        lesson_repo,
        seat_repo,
        invitation_repo,
        identity_form_repo,
        claim_repo,
        invitation_service,
        identity_service,
        claim_service,
        audit_sink,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
