use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::AssignSeatRequest;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

pub async fn assign_seat(
    State(state): State<Arc<AppState>>,
    Path(guest_id): Path<String>,
    Json(payload): Json<AssignSeatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.lifecycle.assign_seat(&guest_id, payload.table.as_deref()).await?;
    Ok(Json(guest))
}

pub async fn check_in(
    State(state): State<Arc<AppState>>,
    Path(guest_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.lifecycle.check_in(&guest_id, Utc::now()).await?;
    Ok(Json(guest))
}

pub async fn list_tables(
    State(state): State<Arc<AppState>>,
    Path(wedding_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rosters = state.lifecycle.list_tables(&wedding_id).await?;
    Ok(Json(rosters))
}

pub async fn bulk_create_tables(
    State(state): State<Arc<AppState>>,
    Path(wedding_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tables = state.lifecycle.bulk_create_tables(&wedding_id).await?;
    Ok(Json(tables))
}
