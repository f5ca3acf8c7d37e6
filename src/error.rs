use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invitation code not found")]
    InviteNotFound,
    #[error("Invitation code has expired")]
    InviteExpired,
    #[error("Invitation code has already been claimed")]
    InviteAlreadyClaimed,
    #[error("Could not allocate a unique invitation code")]
    InviteCodeCollision,
    #[error("Identity form incomplete: {0}")]
    IdentityFormIncomplete(String),
    #[error("Seat was claimed by a concurrent request")]
    SeatClaimed,
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// Stable identifier surfaced to API consumers alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION",
            AppError::InviteNotFound => "INVITE_NOT_FOUND",
            AppError::InviteExpired => "INVITE_EXPIRED",
            AppError::InviteAlreadyClaimed => "INVITE_ALREADY_CLAIMED",
            AppError::InviteCodeCollision => "INVITE_CODE_COLLISION",
            AppError::IdentityFormIncomplete(_) => "IDENTITY_FORM_INCOMPLETE",
            AppError::SeatClaimed => "SEAT_CLAIMED",
            AppError::Internal | AppError::InternalWithMsg(_) => "INTERNAL",
        }
    }
}

/// Duplicate-key detection across both backends.
/// 2067 = SQLite Unique Constraint, 1555 = SQLite Primary Key Constraint,
/// 23505 = PostgreSQL Unique Violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        matches!(db_err.code().as_deref(), Some("2067") | Some("1555") | Some("23505"))
    } else {
        false
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "code": "CONFLICT", "error": "Resource already exists (duplicate entry)" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InviteNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InviteExpired => (StatusCode::GONE, self.to_string()),
            AppError::InviteAlreadyClaimed => (StatusCode::CONFLICT, self.to_string()),
            AppError::InviteCodeCollision => (StatusCode::CONFLICT, self.to_string()),
            AppError::IdentityFormIncomplete(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, format!("Identity form incomplete: {}", msg))
            }
            AppError::SeatClaimed => (StatusCode::CONFLICT, self.to_string()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "code": self.code(),
            "error": message
        }));

        (status, body).into_response()
    }
}
