use crate::domain::{models::notification::NotificationAttempt, ports::NotificationAuditSink};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteNotificationRepo {
    pool: SqlitePool,
}

impl SqliteNotificationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationAuditSink for SqliteNotificationRepo {
    async fn append(&self, attempt: &NotificationAttempt) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO notification_attempts (id, guest_id, wedding_id, channel, kind, recipient, message, template_id, status, error_detail, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
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
            "SELECT * FROM notification_attempts WHERE guest_id = ? ORDER BY created_at DESC"
        )
            .bind(guest_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
