use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AuthStaff, resort::ResortId};
use crate::api::dtos::{requests::CreateLessonRequest, responses::LessonCreatedResponse};
use crate::domain::models::{lesson::Lesson, seat::Seat};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

const MAX_SEATS_PER_LESSON: i32 = 64;

pub async fn create_lesson(
    State(state): State<Arc<AppState>>,
    ResortId(resort_id): ResortId,
    _staff: AuthStaff,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    if payload.seat_count < 1 || payload.seat_count > MAX_SEATS_PER_LESSON {
        return Err(AppError::Validation(format!(
            "seat_count must be between 1 and {}",
            MAX_SEATS_PER_LESSON
        )));
    }

    let lesson = Lesson::new(resort_id, payload.title, payload.starts_at);
    let seats: Vec<Seat> = (1..=payload.seat_count)
        .map(|n| Seat::new(lesson.id.clone(), n))
        .collect();

    let created = state.lesson_repo.create_with_seats(&lesson, &seats).await?;

    info!("Created lesson {} with {} seats", created.id, seats.len());

    Ok(Json(LessonCreatedResponse { lesson: created, seats }))
}

pub async fn list_seats(
    State(state): State<Arc<AppState>>,
    ResortId(resort_id): ResortId,
    _staff: AuthStaff,
    Path((_, lesson_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = state.lesson_repo.find_by_id(&lesson_id).await?
        .ok_or(AppError::NotFound("Lesson not found".into()))?;

    if lesson.resort_id != resort_id {
        return Err(AppError::NotFound("Lesson not found".into()));
    }

    let seats = state.lesson_repo.list_seats(&lesson.id).await?;
    Ok(Json(seats))
}
