use crate::domain::{models::notification::NotificationAttempt, ports::NotificationAuditSink};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationAuditSink for PostgresNotificationRepo {
    async fn append(&self, attempt: &NotificationAttempt) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO notification_attempts (id, guest_id, wedding_id, channel, kind, recipient, message, template_id, status, error_detail, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        )
            .bind(&attempt.id)
            .bind(&attempt.guest_id)
            .bind(&attempt.wedding_id)
            .bind(attempt.channel.as_str())
            .bind(attempt.kind.as_str())
            .bind(&attempt.recipient)
            .bind(&attempt.message)
            .bind(&attempt.template_id)
            .bind(attempt.status.as_str())
            .bind(&attempt.error_detail)
            .bind(attempt.created_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_by_guest(&self, guest_id: &str) -> Result<Vec<NotificationAttempt>, AppError> {
        sqlx::query_as::<_, NotificationAttempt>(
            "SELECT * FROM notification_attempts WHERE guest_id = $1 ORDER BY created_at DESC"
        )
            .bind(guest_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
