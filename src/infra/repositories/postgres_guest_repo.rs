use crate::domain::{models::guest::{Counter, Guest}, ports::GuestRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresGuestRepo {
    pool: PgPool,
}

impl PostgresGuestRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestRepository for PostgresGuestRepo {
    async fn create(&self, guest: &Guest) -> Result<Guest, AppError> {
        sqlx::query_as::<_, Guest>(
            "INSERT INTO guests (id, wedding_id, token, unique_slug, name, phone, email, companions, status, table_name, rsvp_deadline, responded_at, checked_in_at,
                                 invite_sent_count, reminder_count, confirm_sent_count, whatsapp_delivered_count, invitation_sent_at, version, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
             RETURNING *"
        )
            .bind(&guest.id).bind(&guest.wedding_id).bind(&guest.token).bind(&guest.unique_slug)
            .bind(&guest.name).bind(&guest.phone).bind(&guest.email).bind(guest.companions)
            .bind(guest.status.as_str()).bind(&guest.table_name).bind(guest.rsvp_deadline)
            .bind(guest.responded_at).bind(guest.checked_in_at)
            .bind(guest.invite_sent_count).bind(guest.reminder_count).bind(guest.confirm_sent_count)
            .bind(guest.whatsapp_delivered_count).bind(guest.invitation_sent_at)
            .bind(guest.version).bind(guest.created_at).bind(guest.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find(&self, id: &str) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_slug(&self, wedding_id: &str, slug: &str) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE wedding_id = $1 AND unique_slug = $2")
            .bind(wedding_id)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_wedding(&self, wedding_id: &str) -> Result<Vec<Guest>, AppError> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE wedding_id = $1 ORDER BY name ASC")
            .bind(wedding_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_if_version(&self, guest: &Guest, expected_version: i64) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>(
            "UPDATE guests
             SET unique_slug = $1, name = $2, phone = $3, email = $4, companions = $5, status = $6, table_name = $7,
                 rsvp_deadline = $8, responded_at = $9, checked_in_at = $10, updated_at = $11, version = version + 1
             WHERE id = $12 AND version = $13
             RETURNING *"
        )
            .bind(&guest.unique_slug).bind(&guest.name).bind(&guest.phone).bind(&guest.email)
            .bind(guest.companions).bind(guest.status.as_str()).bind(&guest.table_name)
            .bind(guest.rsvp_deadline).bind(guest.responded_at).bind(guest.checked_in_at)
            .bind(guest.updated_at)
            .bind(&guest.id).bind(expected_version)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn increment_counter(&self, id: &str, counter: Counter, sent_at: Option<DateTime<Utc>>) -> Result<Guest, AppError> {
        let column = counter.column();
        let query = format!(
            "UPDATE guests
             SET {column} = {column} + 1,
                 invitation_sent_at = COALESCE($1, invitation_sent_at),
                 updated_at = $2,
                 version = version + 1
             WHERE id = $3
             RETURNING *"
        );

        sqlx::query_as::<_, Guest>(&query)
            .bind(sent_at)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Guest not found".into()))
    }
}
