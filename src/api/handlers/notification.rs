use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::DispatchRequest;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Path(guest_id): Path<String>,
    Json(payload): Json<DispatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = state.lifecycle
        .dispatch(&guest_id, payload.channel, payload.kind, &payload.template_data, Utc::now())
        .await?;
    Ok(Json(result))
}

pub async fn mark_delivered(
    State(state): State<Arc<AppState>>,
    Path(guest_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = state.lifecycle.mark_delivered(&guest_id, Utc::now()).await?;
    Ok(Json(result.guest))
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Path(guest_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = state.lifecycle.list_notifications(&guest_id).await?;
    Ok(Json(attempts))
}

pub async fn list_deliveries(
    State(state): State<Arc<AppState>>,
    Path(guest_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let jobs = state.lifecycle.list_deliveries(&guest_id).await?;
    Ok(Json(jobs))
}
