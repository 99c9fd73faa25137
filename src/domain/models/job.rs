use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::notification::Channel;

pub const JOB_DELIVER_EMAIL: &str = "DELIVER_EMAIL";
pub const JOB_DELIVER_SMS: &str = "DELIVER_SMS";

/// Composed message handed to an outbound channel provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeliveryPayload {
    pub attempt_id: String,
    pub guest_id: String,
    pub wedding_id: String,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Job {
    pub id: String,
    pub job_type: String, // DELIVER_EMAIL or DELIVER_SMS
    pub payload: Json<DeliveryPayload>,
    pub execute_at: DateTime<Utc>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn delivery(channel: Channel, payload: DeliveryPayload) -> Option<Self> {
        let job_type = match channel {
            Channel::Email => JOB_DELIVER_EMAIL,
            Channel::Sms => JOB_DELIVER_SMS,
            Channel::Whatsapp => return None,
        };
        let now = Utc::now();
        Some(Self {
            id: Uuid::new_v4().to_string(),
            job_type: job_type.to_string(),
            payload: Json(payload),
            execute_at: now,
            status: "PENDING".to_string(),
            error_message: None,
            created_at: now,
        })
    }
}
