use crate::domain::models::{guest::GuestStatus, notification::{Channel, NotificationKind}};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
pub struct CreateWeddingRequest {
    pub slug: String,
    pub couple_names: String,
    pub wedding_date: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub default_rsvp_deadline: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct CreateGuestRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub companions: i32,
    pub table_name: Option<String>,
    pub rsvp_deadline: Option<DateTime<Utc>>,
}

/// Absent fields are left unchanged. An empty phone or email clears it.
#[derive(Deserialize)]
pub struct UpdateGuestRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub companions: Option<i32>,
    pub rsvp_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clear_rsvp_deadline: bool,
}

#[derive(Deserialize)]
pub struct RsvpRequest {
    pub decision: GuestStatus,
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: GuestStatus,
}

#[derive(Deserialize)]
pub struct DispatchRequest {
    pub channel: Channel,
    pub kind: NotificationKind,
    #[serde(default)]
    pub template_data: Value,
}

#[derive(Deserialize)]
pub struct AssignSeatRequest {
    pub table: Option<String>,
}
