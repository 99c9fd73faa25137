use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateGuestRequest, SetStatusRequest, UpdateGuestRequest};
use crate::domain::services::lifecycle::{GuestUpdate, NewGuest};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

pub async fn create_guest(
    State(state): State<Arc<AppState>>,
    Path(wedding_id): Path<String>,
    Json(payload): Json<CreateGuestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.lifecycle.add_guest(&wedding_id, NewGuest {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        companions: payload.companions,
        table_name: payload.table_name,
        rsvp_deadline: payload.rsvp_deadline,
    }).await?;

    Ok((StatusCode::CREATED, Json(guest)))
}

pub async fn list_guests(
    State(state): State<Arc<AppState>>,
    Path(wedding_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guests = state.lifecycle.list_guests(&wedding_id).await?;
    Ok(Json(guests))
}

pub async fn get_guest(
    State(state): State<Arc<AppState>>,
    Path(guest_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.lifecycle.get_guest(&guest_id).await?;
    Ok(Json(guest))
}

pub async fn update_guest(
    State(state): State<Arc<AppState>>,
    Path(guest_id): Path<String>,
    Json(payload): Json<UpdateGuestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.lifecycle.update_guest(&guest_id, GuestUpdate {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        companions: payload.companions,
        rsvp_deadline: payload.rsvp_deadline,
        clear_rsvp_deadline: payload.clear_rsvp_deadline,
    }).await?;

    Ok(Json(guest))
}

pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(guest_id): Path<String>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.lifecycle.set_status(&guest_id, payload.status, Utc::now()).await?;
    Ok(Json(guest))
}
