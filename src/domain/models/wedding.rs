use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Wedding {
    pub id: String,
    pub slug: String,
    pub couple_names: String,
    pub wedding_date: Option<DateTime<Utc>>,
    pub timezone: String,
    pub default_rsvp_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Wedding {
    pub fn new(slug: String, couple_names: String, timezone: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            slug,
            couple_names,
            wedding_date: None,
            timezone,
            default_rsvp_deadline: None,
            created_at: Utc::now(),
        }
    }
}
