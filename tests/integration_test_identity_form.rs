mod common;

use axum::http::StatusCode;
use common::{parse_body, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_submit_then_get() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    let body = app.submit_identity(&code, "Mia Brunner", "mia@example.com").await;
    assert_eq!(body["status"], "submitted");
    assert_eq!(body["student_name"], "Mia Brunner");
    assert!(!body["submitted_at"].is_null());
    assert!(body["confirmed_at"].is_null());

    let res = app.router.clone().oneshot(
        axum::http::Request::builder()
            .method("GET")
            .uri(format!("/api/v1/invitations/{}/identity", code))
            .body(axum::body::Body::empty())
            .unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let fetched = parse_body(res).await;
    assert_eq!(fetched["contact_email"], "mia@example.com");
}

#[tokio::test]
async fn test_get_before_submit_is_not_found() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    let res = app.router.clone().oneshot(
        axum::http::Request::builder()
            .method("GET")
            .uri(format!("/api/v1/invitations/{}/identity", code))
            .body(axum::body::Body::empty())
            .unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_empty_name_rejected() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    let res = app.submit_identity_raw(&code, json!({
        "student_name": "  ",
        "contact_email": "mia@example.com"
    })).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "IDENTITY_FORM_INCOMPLETE");
    assert_eq!(app.count("identity_forms").await, 0);
}

#[tokio::test]
async fn test_submit_invalid_email_rejected() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    let res = app.submit_identity_raw(&code, json!({
        "student_name": "Mia Brunner",
        "contact_email": "not-an-email"
    })).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "IDENTITY_FORM_INCOMPLETE");
}

#[tokio::test]
async fn test_resubmit_replaces_form_in_place() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    app.submit_identity(&code, "Mia Brunner", "mia@example.com").await;
    let second = app.submit_identity(&code, "Mia B.", "mia@example.com").await;

    assert_eq!(second["student_name"], "Mia B.");
    assert_eq!(second["status"], "submitted");
    assert_eq!(app.count("identity_forms").await, 1);
}

#[tokio::test]
async fn test_submit_with_unknown_code_fails() {
    let app = TestApp::new().await;

    let res = app.submit_identity_raw("ZZZZ9999", json!({
        "student_name": "Mia Brunner",
        "contact_email": "mia@example.com"
    })).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "INVITE_NOT_FOUND");
}

#[tokio::test]
async fn test_edits_blocked_after_claim() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    app.submit_identity(&code, "Mia Brunner", "mia@example.com").await;

    let claim = app.claim_raw(&code, json!({
        "student_name": "Mia Brunner",
        "contact_email": "mia@example.com"
    })).await;
    assert_eq!(claim.status(), StatusCode::OK);

    // The claimed-check is skipped for form edits, so this gets as far as
    // the confirmed form and fails there.
    let res = app.submit_identity_raw(&code, json!({
        "student_name": "Someone Else",
        "contact_email": "other@example.com"
    })).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_submit_emits_audit_event() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    app.submit_identity(&code, "Mia Brunner", "mia@example.com").await;

    let events = app.audit.events.lock().unwrap();
    let submitted = events.iter().find(|e| e.action == "identity.submitted")
        .expect("No identity.submitted event");
    assert_eq!(submitted.entity_type, "identity_form");
    assert_eq!(submitted.entity_id, seat_ids[0]);
    assert_eq!(submitted.actor, "mia@example.com");
    assert_eq!(submitted.scope, "resort:resort-1");
}
