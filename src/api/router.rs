use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, rsvp, wedding, guest, notification, seating};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public RSVP
        .route("/api/v1/rsvp/{token}", get(rsvp::get_invitation).post(rsvp::respond))
        .route("/api/v1/weddings/by-slug/{wedding_slug}/guests/{slug}", get(rsvp::get_invitation_by_slug))

        // Weddings & guests
        .route("/api/v1/weddings", post(wedding::create_wedding))
        .route("/api/v1/weddings/{wedding_id}", get(wedding::get_wedding))
        .route("/api/v1/weddings/{wedding_id}/guests", post(guest::create_guest).get(guest::list_guests))
        .route("/api/v1/guests/{guest_id}", get(guest::get_guest).put(guest::update_guest))
        .route("/api/v1/guests/{guest_id}/status", post(guest::set_status))

        // Notifications
        .route("/api/v1/guests/{guest_id}/dispatch", post(notification::dispatch))
        .route("/api/v1/guests/{guest_id}/delivered", post(notification::mark_delivered))
        .route("/api/v1/guests/{guest_id}/notifications", get(notification::list_notifications))
        .route("/api/v1/guests/{guest_id}/deliveries", get(notification::list_deliveries))

        // Seating & check-in
        .route("/api/v1/guests/{guest_id}/seat", post(seating::assign_seat))
        .route("/api/v1/guests/{guest_id}/check-in", post(seating::check_in))
        .route("/api/v1/weddings/{wedding_id}/tables", get(seating::list_tables))
        .route("/api/v1/weddings/{wedding_id}/tables/bulk", post(seating::bulk_create_tables))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
