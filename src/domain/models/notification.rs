use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::guest::Counter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Whatsapp,
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Whatsapp => "whatsapp",
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }

    pub fn uses_phone(&self) -> bool {
        matches!(self, Channel::Whatsapp | Channel::Sms)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whatsapp" => Ok(Channel::Whatsapp),
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            other => Err(format!("unknown channel '{}'", other)),
        }
    }
}

impl TryFrom<String> for Channel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Invite,
    Reminder,
    ManualConfirm,
    DeliveryAck,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Invite => "invite",
            NotificationKind::Reminder => "reminder",
            NotificationKind::ManualConfirm => "manual_confirm",
            NotificationKind::DeliveryAck => "delivery_ack",
        }
    }

    pub fn counter(&self) -> Counter {
        match self {
            NotificationKind::Invite => Counter::InviteSent,
            NotificationKind::Reminder => Counter::Reminder,
            NotificationKind::ManualConfirm => Counter::ConfirmSent,
            NotificationKind::DeliveryAck => Counter::WhatsappDelivered,
        }
    }

    /// Kinds that put a message in front of the guest and therefore stamp
    /// `invitation_sent_at`.
    pub fn is_send(&self) -> bool {
        !matches!(self, NotificationKind::DeliveryAck)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invite" => Ok(NotificationKind::Invite),
            "reminder" => Ok(NotificationKind::Reminder),
            "manual_confirm" => Ok(NotificationKind::ManualConfirm),
            "delivery_ack" => Ok(NotificationKind::DeliveryAck),
            other => Err(format!("unknown notification kind '{}'", other)),
        }
    }
}

impl TryFrom<String> for NotificationKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Pending,
    Sent,
    Failed,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Pending => "pending",
            AttemptStatus::Sent => "sent",
            AttemptStatus::Failed => "failed",
        }
    }
}

impl TryFrom<String> for AttemptStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(AttemptStatus::Pending),
            "sent" => Ok(AttemptStatus::Sent),
            "failed" => Ok(AttemptStatus::Failed),
            other => Err(format!("unknown attempt status '{}'", other)),
        }
    }
}

/// Append-only audit entry, one per dispatch attempt.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct NotificationAttempt {
    pub id: String,
    pub guest_id: String,
    pub wedding_id: String,
    #[sqlx(try_from = "String")]
    pub channel: Channel,
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    pub recipient: String,
    pub message: Option<String>,
    pub template_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: AttemptStatus,
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotificationAttempt {
    pub fn sent(
        guest_id: &str,
        wedding_id: &str,
        channel: Channel,
        kind: NotificationKind,
        recipient: String,
        message: Option<String>,
        template_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            guest_id: guest_id.to_string(),
            wedding_id: wedding_id.to_string(),
            channel,
            kind,
            recipient,
            message,
            template_id,
            status: AttemptStatus::Sent,
            error_detail: None,
            created_at: Utc::now(),
        }
    }

    pub fn failed(
        guest_id: &str,
        wedding_id: &str,
        channel: Channel,
        kind: NotificationKind,
        recipient: String,
        error_detail: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            guest_id: guest_id.to_string(),
            wedding_id: wedding_id.to_string(),
            channel,
            kind,
            recipient,
            message: None,
            template_id: None,
            status: AttemptStatus::Failed,
            error_detail: Some(error_detail),
            created_at: Utc::now(),
        }
    }
}
