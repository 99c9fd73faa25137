use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::models::guest::GuestStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("The RSVP deadline ({0}) has passed. Please contact the organizers directly.")]
    DeadlineExpired(DateTime<Utc>),
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: GuestStatus, to: GuestStatus },
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("Unsupported channel/kind combination: {0}")]
    InvalidChannel(String),
    #[error("Template render error: {0}")]
    TemplateRender(String),
    #[error("Could not generate a unique slug after {0} attempts")]
    SlugGenerationExhausted(usize),
    #[error("Concurrent update conflict: {0}")]
    ConcurrencyConflict(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    // 2067 = SQLite Unique Constraint
    // 23505 = PostgreSQL Unique Violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(e) => e
                .as_database_error()
                .and_then(|db_err| db_err.code())
                .is_some_and(|code| code == "2067" || code == "23505"),
            _ => false,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::NotFound(_) => "not_found",
            AppError::DeadlineExpired(_) => "deadline_expired",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::InvalidRecipient(_) => "invalid_recipient",
            AppError::InvalidChannel(_) => "invalid_channel",
            AppError::TemplateRender(_) => "template_render_error",
            AppError::SlugGenerationExhausted(_) => "slug_generation_exhausted",
            AppError::ConcurrencyConflict(_) => "concurrency_conflict",
            AppError::Conflict(_) => "conflict",
            AppError::Validation(_) => "validation",
            AppError::InternalWithMsg(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Database(e) => {
                if self.is_unique_violation() {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)", "code": "conflict" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::DeadlineExpired(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::InvalidTransition { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidRecipient(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::InvalidChannel(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::TemplateRender(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::SlugGenerationExhausted(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::ConcurrencyConflict(msg) => {
                error!("Gave up on concurrent update: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Please retry the request".to_string())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}
