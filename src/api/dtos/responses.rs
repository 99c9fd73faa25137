use crate::domain::models::guest::{Guest, GuestStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What the guest sees on the public invitation page. Never carries the
/// token or contact details.
#[derive(Serialize)]
pub struct GuestView {
    pub name: String,
    pub unique_slug: Option<String>,
    pub companions: i32,
    pub status: GuestStatus,
    pub table_name: Option<String>,
    pub rsvp_deadline: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl From<Guest> for GuestView {
    fn from(g: Guest) -> Self {
        Self {
            name: g.name,
            unique_slug: g.unique_slug,
            companions: g.companions,
            status: g.status,
            table_name: g.table_name,
            rsvp_deadline: g.rsvp_deadline,
            responded_at: g.responded_at,
            checked_in_at: g.checked_in_at,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
