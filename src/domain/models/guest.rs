use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Upper bound on companions a single invitation may bring.
pub const MAX_COMPANIONS: i32 = 50;

/// RSVP status of a guest. Stored as lower snake case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestStatus {
    Pending,
    Confirmed,
    Rejected,
    CheckedIn,
}

impl GuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestStatus::Pending => "pending",
            GuestStatus::Confirmed => "confirmed",
            GuestStatus::Rejected => "rejected",
            GuestStatus::CheckedIn => "checked_in",
        }
    }
}

impl fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(GuestStatus::Pending),
            "confirmed" => Ok(GuestStatus::Confirmed),
            "rejected" => Ok(GuestStatus::Rejected),
            "checked_in" => Ok(GuestStatus::CheckedIn),
            other => Err(format!("unknown guest status '{}'", other)),
        }
    }
}

impl TryFrom<String> for GuestStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-guest counters, one per notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    InviteSent,
    Reminder,
    ConfirmSent,
    WhatsappDelivered,
}

impl Counter {
    pub fn column(&self) -> &'static str {
        match self {
            Counter::InviteSent => "invite_sent_count",
            Counter::Reminder => "reminder_count",
            Counter::ConfirmSent => "confirm_sent_count",
            Counter::WhatsappDelivered => "whatsapp_delivered_count",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Guest {
    pub id: String,
    pub wedding_id: String,
    pub token: String,
    pub unique_slug: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub companions: i32,
    #[sqlx(try_from = "String")]
    pub status: GuestStatus,
    pub table_name: Option<String>,
    pub rsvp_deadline: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub invite_sent_count: i64,
    pub reminder_count: i64,
    pub confirm_sent_count: i64,
    pub whatsapp_delivered_count: i64,
    pub invitation_sent_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewGuestParams {
    pub wedding_id: String,
    pub token: String,
    pub unique_slug: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub companions: i32,
    pub table_name: Option<String>,
    pub rsvp_deadline: Option<DateTime<Utc>>,
}

impl Guest {
    pub fn new(params: NewGuestParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            wedding_id: params.wedding_id,
            token: params.token,
            unique_slug: params.unique_slug,
            name: params.name,
            phone: params.phone,
            email: params.email,
            companions: params.companions,
            status: GuestStatus::Pending,
            table_name: params.table_name,
            rsvp_deadline: params.rsvp_deadline,
            responded_at: None,
            checked_in_at: None,
            invite_sent_count: 0,
            reminder_count: 0,
            confirm_sent_count: 0,
            whatsapp_delivered_count: 0,
            invitation_sent_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn counter(&self, counter: Counter) -> i64 {
        match counter {
            Counter::InviteSent => self.invite_sent_count,
            Counter::Reminder => self.reminder_count,
            Counter::ConfirmSent => self.confirm_sent_count,
            Counter::WhatsappDelivered => self.whatsapp_delivered_count,
        }
    }

    /// Number of seats this guest occupies: the guest plus companions.
    pub fn party_size(&self) -> i32 {
        self.companions.clamp(0, MAX_COMPANIONS).saturating_add(1)
    }
}
