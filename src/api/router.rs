use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{claim, health, identity, invitation, lesson};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Lesson Admin
        .route("/api/v1/{resort_id}/lessons", post(lesson::create_lesson))
        .route("/api/v1/{resort_id}/lessons/{lesson_id}/seats", get(lesson::list_seats))

        // Invitation Admin
        .route("/api/v1/{resort_id}/seats/{seat_id}/invitation", post(invitation::issue_invitation))

        // Public Claim Flow
        .route("/api/v1/invitations/{code}", get(invitation::verify_invitation))
        .route("/api/v1/invitations/{code}/identity", get(identity::get_identity_form).put(identity::submit_identity_form))
        .route("/api/v1/invitations/{code}/claim", post(claim::claim_seat))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        resort_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
