use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::guest::Guest;

/// Seating table row. `capacity` is derived from guest assignments.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Table {
    pub id: String,
    pub wedding_id: String,
    pub name: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table {
    pub fn new(wedding_id: String, name: String, capacity: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            wedding_id,
            name,
            capacity,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct TableRoster {
    pub name: String,
    pub guests: Vec<Guest>,
    pub total: i32,
}
