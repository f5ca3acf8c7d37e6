use seatclaim_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::auth::Claims,
    domain::ports::{AuditEvent, AuditSink, ClaimRepository, IdentityFormRepository, InvitationRepository, LessonRepository, SeatRepository},
    domain::services::claim_service::ClaimService,
    domain::services::identity_service::IdentityFormService,
    domain::services::invitation_service::InvitationService,
    infra::repositories::{
        sqlite_claim_repo::SqliteClaimRepo,
        sqlite_identity_form_repo::SqliteIdentityFormRepo,
        sqlite_invitation_repo::SqliteInvitationRepo,
        sqlite_lesson_repo::SqliteLessonRepo,
        sqlite_seat_repo::SqliteSeatRepo,
    },
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Collects audit events in memory so tests can assert on what was emitted.
pub struct RecordingAuditSink {
    pub events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub audit: Arc<RecordingAuditSink>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            audit_sink_url: "http://localhost".to_string(),
            audit_sink_token: "token".to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
        };

        let audit = Arc::new(RecordingAuditSink { events: Mutex::new(Vec::new()) });
        let audit_sink: Arc<dyn AuditSink> = audit.clone();

        let lesson_repo: Arc<dyn LessonRepository> = Arc::new(SqliteLessonRepo::new(pool.clone()));
        let seat_repo: Arc<dyn SeatRepository> = Arc::new(SqliteSeatRepo::new(pool.clone()));
        let invitation_repo: Arc<dyn InvitationRepository> = Arc::new(SqliteInvitationRepo::new(pool.clone()));
        let identity_form_repo: Arc<dyn IdentityFormRepository> = Arc::new(SqliteIdentityFormRepo::new(pool.clone()));
        let claim_repo: Arc<dyn ClaimRepository> = Arc::new(SqliteClaimRepo::new(pool.clone()));

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

        let state = Arc::new(AppState {
            config,
            lesson_repo,
            seat_repo,
            invitation_repo,
            identity_form_repo,
            claim_repo,
            invitation_service,
            identity_service,
            claim_service,
            audit_sink,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            audit,
        }
    }

    pub fn staff_token(&self, resort_id: &str) -> String {
        let claims = Claims {
            sub: "staff-1".to_string(),
            resort_id: resort_id.to_string(),
            role: "ADMIN".to_string(),
            exp: (Utc::now() + ChronoDuration::hours(1)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("Failed to mint test token")
    }

    /// Creates a lesson with `seat_count` seats; returns (lesson_id, seat_ids).
    pub async fn create_lesson(&self, resort_id: &str, seat_count: i32) -> (String, Vec<String>) {
        let token = self.staff_token(resort_id);
        let payload = json!({
            "title": "Beginner Ski Group",
            "starts_at": (Utc::now() + ChronoDuration::days(3)).to_rfc3339(),
            "seat_count": seat_count
        });

        let res = self.router.clone().oneshot(
            Request::builder().method("POST").uri(format!("/api/v1/{}/lessons", resort_id))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(payload.to_string())).unwrap()
        ).await.unwrap();

        assert!(res.status().is_success(), "Lesson create failed: {}", res.status());
        let body = parse_body(res).await;

        let lesson_id = body["lesson"]["id"].as_str().unwrap().to_string();
        let seat_ids = body["seats"].as_array().unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap().to_string())
            .collect();

        (lesson_id, seat_ids)
    }

    /// Issues (or regenerates) an invitation and returns the code.
    pub async fn issue_invitation(&self, resort_id: &str, seat_id: &str) -> String {
        let res = self.issue_invitation_raw(resort_id, seat_id).await;
        assert!(res.status().is_success(), "Issue failed: {}", res.status());
        let body = parse_body(res).await;
        body["code"].as_str().unwrap().to_string()
    }

    pub async fn issue_invitation_raw(&self, resort_id: &str, seat_id: &str) -> axum::response::Response {
        let token = self.staff_token(resort_id);
        self.router.clone().oneshot(
            Request::builder().method("POST").uri(format!("/api/v1/{}/seats/{}/invitation", resort_id, seat_id))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(json!({}).to_string())).unwrap()
        ).await.unwrap()
    }

    pub async fn submit_identity_raw(&self, code: &str, payload: Value) -> axum::response::Response {
        self.router.clone().oneshot(
            Request::builder().method("PUT").uri(format!("/api/v1/invitations/{}/identity", code))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string())).unwrap()
        ).await.unwrap()
    }

    pub async fn submit_identity(&self, code: &str, name: &str, email: &str) -> Value {
        let res = self.submit_identity_raw(code, json!({
            "student_name": name,
            "contact_email": email
        })).await;
        assert!(res.status().is_success(), "Identity submit failed: {}", res.status());
        parse_body(res).await
    }

    pub async fn claim_raw(&self, code: &str, payload: Value) -> axum::response::Response {
        self.router.clone().oneshot(
            Request::builder().method("POST").uri(format!("/api/v1/invitations/{}/claim", code))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string())).unwrap()
        ).await.unwrap()
    }

    pub async fn verify_raw(&self, code: &str) -> axum::response::Response {
        self.router.clone().oneshot(
            Request::builder().method("GET").uri(format!("/api/v1/invitations/{}", code))
                .body(Body::empty()).unwrap()
        ).await.unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        use sqlx::Row;
        let row = sqlx::query(&format!("SELECT COUNT(*) as count FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap();
        row.get::<i64, _>("count")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
