use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{requests::RsvpRequest, responses::GuestView};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

pub async fn get_invitation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.lifecycle.get_guest_by_token(&token).await?;
    Ok(Json(GuestView::from(guest)))
}

pub async fn respond(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<RsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.lifecycle.confirm_or_reject(&token, payload.decision, Utc::now()).await?;
    Ok(Json(GuestView::from(guest)))
}

pub async fn get_invitation_by_slug(
    State(state): State<Arc<AppState>>,
    Path((wedding_slug, slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.lifecycle.get_guest_by_slug(&wedding_slug, &slug).await?;
    Ok(Json(GuestView::from(guest)))
}
