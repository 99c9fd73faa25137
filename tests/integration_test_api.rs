mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

async fn setup(app: &TestApp) -> (String, serde_json::Value) {
    let (status, wedding) = app.request("POST", "/api/v1/weddings", Some(json!({
        "slug": "ana-rui",
        "couple_names": "Ana & Rui",
        "timezone": "Africa/Maputo",
        "wedding_date": "2030-09-14T15:00:00Z"
    }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", wedding);
    let wedding_id = wedding["id"].as_str().unwrap().to_string();

    let (status, guest) = app.request("POST", &format!("/api/v1/weddings/{}/guests", wedding_id), Some(json!({
        "name": "João Silva",
        "phone": "84 123 4567",
        "email": "joao@example.com",
        "companions": 1,
        "table_name": "3"
    }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", guest);
    (wedding_id, guest)
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_public_invitation_hides_credentials() {
    let app = TestApp::new().await;
    let (_, guest) = setup(&app).await;
    let token = guest["token"].as_str().unwrap();
    assert_eq!(guest["status"], "pending");
    assert!(guest["unique_slug"].as_str().unwrap().starts_with("joao-silva-"));

    let (status, view) = app.request("GET", &format!("/api/v1/rsvp/{}", token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["name"], "João Silva");
    assert!(view.get("token").is_none());
    assert!(view.get("phone").is_none());
    assert!(view.get("email").is_none());

    let slug = guest["unique_slug"].as_str().unwrap();
    let (status, by_slug) = app.request("GET", &format!("/api/v1/weddings/by-slug/ana-rui/guests/{}", slug), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_slug["name"], "João Silva");
}

#[tokio::test]
async fn test_invalid_link_is_404() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/api/v1/rsvp/not-a-token", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid invitation link");
    assert_eq!(body["code"], "not_found");

    let (status, _) = app.request("GET", "/api/v1/weddings/by-slug/nobody/guests/none", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rsvp_and_door_flow_over_http() {
    let app = TestApp::new().await;
    let (_, guest) = setup(&app).await;
    let token = guest["token"].as_str().unwrap();
    let guest_id = guest["id"].as_str().unwrap();

    let (status, body) = app.request("POST", &format!("/api/v1/guests/{}/check-in", guest_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_transition");

    let (status, view) = app.request("POST", &format!("/api/v1/rsvp/{}", token), Some(json!({ "decision": "confirmed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "confirmed");

    let (status, checked) = app.request("POST", &format!("/api/v1/guests/{}/check-in", guest_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checked["status"], "checked_in");

    let (status, again) = app.request("POST", &format!("/api/v1/guests/{}/check-in", guest_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["checked_in_at"], checked["checked_in_at"]);
}

#[tokio::test]
async fn test_late_answer_over_http_is_422() {
    let app = TestApp::new().await;
    let (wedding_id, _) = setup(&app).await;

    let (status, guest) = app.request("POST", &format!("/api/v1/weddings/{}/guests", wedding_id), Some(json!({
        "name": "Late Guest",
        "rsvp_deadline": "2020-01-01T00:00:00Z"
    }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", guest);
    let token = guest["token"].as_str().unwrap();

    let (status, body) = app.request("POST", &format!("/api/v1/rsvp/{}", token), Some(json!({ "decision": "rejected" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "deadline_expired");
    assert!(body["error"].as_str().unwrap().contains("has passed"), "{}", body);

    let (_, view) = app.request("GET", &format!("/api/v1/rsvp/{}", token), None).await;
    assert_eq!(view["status"], "pending");
}

#[tokio::test]
async fn test_oversized_party_is_rejected_and_tables_still_list() {
    let app = TestApp::new().await;
    let (wedding_id, guest) = setup(&app).await;
    let guest_id = guest["id"].as_str().unwrap();

    let (status, body) = app.request("POST", &format!("/api/v1/weddings/{}/guests", wedding_id), Some(json!({
        "name": "Huge Party",
        "companions": 2147483647,
        "table_name": "3"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");

    let (status, _) = app.request("PUT", &format!("/api/v1/guests/{}", guest_id), Some(json!({ "companions": 51 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, tables) = app.request("GET", &format!("/api/v1/weddings/{}/tables", wedding_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tables[0]["total"], 2);
}

#[tokio::test]
async fn test_unknown_enum_values_are_rejected() {
    let app = TestApp::new().await;
    let (_, guest) = setup(&app).await;
    let token = guest["token"].as_str().unwrap();
    let guest_id = guest["id"].as_str().unwrap();

    let (status, _) = app.request("POST", &format!("/api/v1/rsvp/{}", token), Some(json!({ "decision": "maybe" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.request("POST", &format!("/api/v1/guests/{}/dispatch", guest_id), Some(json!({
        "channel": "telegram", "kind": "invite"
    }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app.request("POST", &format!("/api/v1/rsvp/{}", token), Some(json!({ "decision": "checked_in" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn test_dispatch_over_http() {
    let app = TestApp::new().await;
    let (_, guest) = setup(&app).await;
    let guest_id = guest["id"].as_str().unwrap();

    let (status, body) = app.request("POST", &format!("/api/v1/guests/{}/dispatch", guest_id), Some(json!({
        "channel": "whatsapp",
        "kind": "invite",
        "template_data": { "couple_names": "Ana e Rui" }
    }))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["whatsapp_mobile_url"].as_str().unwrap().starts_with("https://wa.me/258841234567?text="));
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Ana e Rui"));
    assert!(message.contains("14/09/2030"));
    assert!(message.contains("https://rsvp.test/ana-rui/invite/joao-silva-"));
    assert_eq!(body["guest"]["invite_sent_count"], 1);

    let (status, body) = app.request("POST", &format!("/api/v1/guests/{}/delivered", guest_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["whatsapp_delivered_count"], 1);

    let (status, body) = app.request("GET", &format!("/api/v1/guests/{}/deliveries", guest_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.request("POST", &format!("/api/v1/guests/{}/dispatch", guest_id), Some(json!({
        "channel": "email", "kind": "delivery_ack"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_channel");

    let (status, audit) = app.request("GET", &format!("/api/v1/guests/{}/notifications", guest_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let audit = audit.as_array().unwrap();
    assert_eq!(audit.len(), 3);
    assert_eq!(audit.iter().filter(|a| a["status"] == "failed").count(), 1);
}

#[tokio::test]
async fn test_admin_status_and_seating_over_http() {
    let app = TestApp::new().await;
    let (wedding_id, guest) = setup(&app).await;
    let guest_id = guest["id"].as_str().unwrap();

    let (status, body) = app.request("POST", &format!("/api/v1/guests/{}/status", guest_id), Some(json!({ "status": "rejected" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");

    let (status, body) = app.request("POST", &format!("/api/v1/guests/{}/seat", guest_id), Some(json!({ "table": "7" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["table_name"], "7");

    let (status, tables) = app.request("GET", &format!("/api/v1/weddings/{}/tables", wedding_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tables[0]["name"], "7");
    assert_eq!(tables[0]["total"], 2);

    let (status, created) = app.request("POST", &format!("/api/v1/weddings/{}/tables/bulk", wedding_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created[0]["capacity"], 2);

    let (status, updated) = app.request("PUT", &format!("/api/v1/guests/{}", guest_id), Some(json!({ "companions": 3 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["companions"], 3);
    assert_eq!(updated["token"], guest["token"]);

    let (status, list) = app.request("GET", &format!("/api/v1/weddings/{}/guests", wedding_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_wedding_slug_conflicts() {
    let app = TestApp::new().await;
    setup(&app).await;
    let (status, body) = app.request("POST", "/api/v1/weddings", Some(json!({
        "slug": "ana-rui", "couple_names": "Other"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, _) = app.request("POST", "/api/v1/weddings", Some(json!({
        "slug": "tz-check", "couple_names": "X", "timezone": "Mars/Olympus"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
