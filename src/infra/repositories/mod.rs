pub mod sqlite_wedding_repo;
pub mod sqlite_guest_repo;
pub mod sqlite_notification_repo;
pub mod sqlite_table_repo;
pub mod sqlite_job_repo;

pub mod postgres_wedding_repo;
pub mod postgres_guest_repo;
pub mod postgres_notification_repo;
pub mod postgres_table_repo;
pub mod postgres_job_repo;
