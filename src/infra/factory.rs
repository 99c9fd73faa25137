use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{
    ChannelProvider, GuestRepository, JobRepository, NotificationAuditSink, TableRepository,
    WeddingRepository,
};
use crate::domain::services::{
    dispatcher::Dispatcher,
    lifecycle::{LifecycleDeps, LifecycleService},
    templates::build_templates,
};
use crate::infra::providers::{http_email_service::HttpEmailService, http_sms_service::HttpSmsService};
use crate::infra::repositories::{
    postgres_guest_repo::PostgresGuestRepo, postgres_job_repo::PostgresJobRepo,
    postgres_notification_repo::PostgresNotificationRepo, postgres_table_repo::PostgresTableRepo,
    postgres_wedding_repo::PostgresWeddingRepo,
    sqlite_guest_repo::SqliteGuestRepo, sqlite_job_repo::SqliteJobRepo,
    sqlite_notification_repo::SqliteNotificationRepo, sqlite_table_repo::SqliteTableRepo,
    sqlite_wedding_repo::SqliteWeddingRepo,
};

/// Repository set for one backing database.
pub struct Repositories {
    pub weddings: Arc<dyn WeddingRepository>,
    pub guests: Arc<dyn GuestRepository>,
    pub tables: Arc<dyn TableRepository>,
    pub audit: Arc<dyn NotificationAuditSink>,
    pub jobs: Arc<dyn JobRepository>,
}

impl Repositories {
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            weddings: Arc::new(SqliteWeddingRepo::new(pool.clone())),
            guests: Arc::new(SqliteGuestRepo::new(pool.clone())),
            tables: Arc::new(SqliteTableRepo::new(pool.clone())),
            audit: Arc::new(SqliteNotificationRepo::new(pool.clone())),
            jobs: Arc::new(SqliteJobRepo::new(pool)),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            weddings: Arc::new(PostgresWeddingRepo::new(pool.clone())),
            guests: Arc::new(PostgresGuestRepo::new(pool.clone())),
            tables: Arc::new(PostgresTableRepo::new(pool.clone())),
            audit: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            jobs: Arc::new(PostgresJobRepo::new(pool)),
        }
    }
}

/// Wires the lifecycle facade and delivery providers on top of `repos`.
pub fn assemble_state(
    config: &Config,
    repos: Repositories,
    email_provider: Arc<dyn ChannelProvider>,
    sms_provider: Arc<dyn ChannelProvider>,
) -> AppState {
    let templates = Arc::new(build_templates().expect("Failed to load message templates"));
    let dispatcher = Dispatcher::new(
        templates,
        config.public_base_url.clone(),
        config.default_country_code.clone(),
    );

    let lifecycle = Arc::new(LifecycleService::new(LifecycleDeps {
        weddings: repos.weddings,
        guests: repos.guests,
        tables: repos.tables,
        audit: repos.audit,
        jobs: repos.jobs.clone(),
        dispatcher,
        max_retries: config.max_update_retries,
    }));

    AppState {
        config: config.clone(),
        lifecycle,
        job_repo: repos.jobs,
        email_provider,
        sms_provider,
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let email_provider = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));
    let sms_provider = Arc::new(HttpSmsService::new(
        config.sms_service_url.clone(),
        config.sms_service_token.clone(),
    ));

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        Repositories::postgres(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        Repositories::sqlite(pool)
    };

    assemble_state(config, repos, email_provider, sms_provider)
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
