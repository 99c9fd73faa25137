use crate::domain::models::{
    guest::{Counter, Guest},
    job::Job,
    notification::NotificationAttempt,
    table::Table,
    wedding::Wedding,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait WeddingRepository: Send + Sync {
    async fn create(&self, wedding: &Wedding) -> Result<Wedding, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Wedding>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Wedding>, AppError>;
}

/// Durable guest table. Every write bumps `version`.
#[async_trait]
pub trait GuestRepository: Send + Sync {
    async fn create(&self, guest: &Guest) -> Result<Guest, AppError>;
    async fn find(&self, id: &str) -> Result<Option<Guest>, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Guest>, AppError>;
    async fn find_by_slug(&self, wedding_id: &str, slug: &str) -> Result<Option<Guest>, AppError>;
    async fn list_by_wedding(&self, wedding_id: &str) -> Result<Vec<Guest>, AppError>;

    /// Compare-and-swap write of the mutable guest fields. Counters are left
    /// untouched. Returns `None` when `expected_version` is stale.
    async fn update_if_version(&self, guest: &Guest, expected_version: i64) -> Result<Option<Guest>, AppError>;

    /// Single-statement atomic `counter += 1`, optionally stamping
    /// `invitation_sent_at`.
    async fn increment_counter(
        &self,
        id: &str,
        counter: Counter,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<Guest, AppError>;
}

#[async_trait]
pub trait NotificationAuditSink: Send + Sync {
    async fn append(&self, attempt: &NotificationAttempt) -> Result<(), AppError>;
    async fn list_by_guest(&self, guest_id: &str) -> Result<Vec<NotificationAttempt>, AppError>;
}

#[async_trait]
pub trait TableRepository: Send + Sync {
    /// Upserts every `(name, capacity)` pair keyed by `(wedding_id, name)` in
    /// one transaction.
    async fn upsert_many(&self, wedding_id: &str, tables: &[(String, i32)]) -> Result<Vec<Table>, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, AppError>;
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
    async fn list_by_guest(&self, guest_id: &str) -> Result<Vec<Job>, AppError>;
}

/// Raw outbound sender (email gateway, SMS gateway).
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> Result<(), AppError>;
}
