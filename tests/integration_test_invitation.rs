mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{parse_body, TestApp};
use sqlx::Row;
use tower::ServiceExt;

const ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[tokio::test]
async fn test_issue_creates_code_and_invites_seat() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;

    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| ALPHABET.contains(c)), "Code {} outside alphabet", code);

    let row = sqlx::query("SELECT status, version FROM seats WHERE id = ?")
        .bind(&seat_ids[0])
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("status"), "invited");
    assert_eq!(row.get::<i64, _>("version"), 1);
}

#[tokio::test]
async fn test_issue_default_expiry_is_seven_days() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;

    let res = app.issue_invitation_raw("resort-1", &seat_ids[0]).await;
    let body = parse_body(res).await;

    let expires_at = chrono::DateTime::parse_from_rfc3339(body["expires_at"].as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc);
    let delta = expires_at - Utc::now();

    assert!(delta > Duration::days(6), "Expiry too close: {:?}", delta);
    assert!(delta <= Duration::days(7), "Expiry too far: {:?}", delta);
}

#[tokio::test]
async fn test_issue_twice_updates_same_row() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;

    let first_code = app.issue_invitation("resort-1", &seat_ids[0]).await;
    let second_code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    assert_ne!(first_code, second_code);
    assert_eq!(app.count("invitations").await, 1);

    // The regenerated code replaces the old one entirely.
    let old = app.verify_raw(&first_code).await;
    assert_eq!(old.status(), StatusCode::NOT_FOUND);

    let new = app.verify_raw(&second_code).await;
    assert_eq!(new.status(), StatusCode::OK);
    let body = parse_body(new).await;
    assert_eq!(body["seat_id"].as_str().unwrap(), seat_ids[0]);
    assert_eq!(body["is_expired"], false);
    assert_eq!(body["is_claimed"], false);
}

#[tokio::test]
async fn test_verify_unknown_code() {
    let app = TestApp::new().await;

    let res = app.verify_raw("ZZZZ9999").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "INVITE_NOT_FOUND");
}

#[tokio::test]
async fn test_verify_reports_expiry_before_claimed_state() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    // Both expired and claimed: expiry must win.
    sqlx::query("UPDATE invitations SET expires_at = ?, claimed_at = ? WHERE code = ?")
        .bind(Utc::now() - Duration::days(1))
        .bind(Utc::now() - Duration::days(2))
        .bind(&code)
        .execute(&app.pool)
        .await
        .unwrap();

    let res = app.verify_raw(&code).await;
    assert_eq!(res.status(), StatusCode::GONE);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "INVITE_EXPIRED");
}

#[tokio::test]
async fn test_verify_claimed_code_conflicts() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    sqlx::query("UPDATE invitations SET claimed_at = ? WHERE code = ?")
        .bind(Utc::now())
        .bind(&code)
        .execute(&app.pool)
        .await
        .unwrap();

    let res = app.verify_raw(&code).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "INVITE_ALREADY_CLAIMED");
}

#[tokio::test]
async fn test_issue_rejects_claimed_invitation() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;
    let code = app.issue_invitation("resort-1", &seat_ids[0]).await;

    sqlx::query("UPDATE invitations SET claimed_at = ? WHERE code = ?")
        .bind(Utc::now())
        .bind(&code)
        .execute(&app.pool)
        .await
        .unwrap();

    let res = app.issue_invitation_raw("resort-1", &seat_ids[0]).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "INVITE_ALREADY_CLAIMED");
}

#[tokio::test]
async fn test_issue_requires_staff_token() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;

    let res = app.router.clone().oneshot(
        axum::http::Request::builder()
            .method("POST")
            .uri(format!("/api/v1/resort-1/seats/{}/invitation", seat_ids[0]))
            .header("Content-Type", "application/json")
            .body(axum::body::Body::from("{}"))
            .unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_issue_for_foreign_resort_is_hidden() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;

    // Same seat addressed through another resort's scope.
    let res = app.issue_invitation_raw("resort-2", &seat_ids[0]).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_issue_emits_audit_events() {
    let app = TestApp::new().await;
    let (_, seat_ids) = app.create_lesson("resort-1", 1).await;

    app.issue_invitation("resort-1", &seat_ids[0]).await;
    app.issue_invitation("resort-1", &seat_ids[0]).await;

    let events = app.audit.events.lock().unwrap();
    let actions: Vec<&str> = events.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["invitation.issued", "invitation.refreshed"]);
    assert_eq!(events[0].entity_id, seat_ids[0]);
    assert_eq!(events[0].scope, "resort:resort-1");
    assert_eq!(events[0].actor, "staff-1");
}
