use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateWeddingRequest;
use crate::domain::services::lifecycle::NewWedding;
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_wedding(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateWeddingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let wedding = state.lifecycle.create_wedding(NewWedding {
        slug: payload.slug,
        couple_names: payload.couple_names,
        wedding_date: payload.wedding_date,
        timezone: payload.timezone,
        default_rsvp_deadline: payload.default_rsvp_deadline,
    }).await?;

    Ok((StatusCode::CREATED, Json(wedding)))
}

pub async fn get_wedding(
    State(state): State<Arc<AppState>>,
    Path(wedding_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let wedding = state.lifecycle.get_wedding(&wedding_id).await?;
    Ok(Json(wedding))
}
