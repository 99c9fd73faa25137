use rsvp_backend::{
    config::Config,
    domain::models::{job::{DeliveryPayload, Job}, notification::Channel},
    domain::ports::{ChannelProvider, JobRepository},
    domain::services::lifecycle::{NewGuest, NewWedding},
    error::AppError,
    infra::factory::{assemble_state, Repositories},
    infra::repositories::postgres_job_repo::PostgresJobRepo,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

struct NullProvider;

#[async_trait]
impl ChannelProvider for NullProvider {
    async fn send(&self, _recipient: &str, _subject: Option<&str>, _body: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Returns a migrated pool, or `None` when no PostgreSQL database is configured.
async fn postgres_pool() -> Option<PgPool> {
    let db_url = std::env::var("DATABASE_URL").ok()?;
    if !db_url.starts_with("postgres") {
        println!("Skipping concurrency test (not targeting Postgres)");
        return None;
    }

    let opts = PgConnectOptions::from_str(&db_url)
        .unwrap()
        .log_statements(tracing::log::LevelFilter::Debug);

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect_with(opts)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!("./migrations/postgres")
        .run(&pool)
        .await
        .expect("Failed to migrate");
    Some(pool)
}

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        port: 0,
        public_base_url: "https://rsvp.test".to_string(),
        mail_service_url: String::new(),
        mail_service_token: String::new(),
        sms_service_url: String::new(),
        sms_service_token: String::new(),
        default_country_code: None,
        max_update_retries: 20,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_job_claims_never_overlap() {
    let Some(pool) = postgres_pool().await else { return };
    let repo = Arc::new(PostgresJobRepo::new(pool.clone()));
    let run_tag = Uuid::new_v4().to_string();

    let total_jobs = 100;
    let now = Utc::now();
    for i in 0..total_jobs {
        let mut job = Job::delivery(Channel::Email, DeliveryPayload {
            attempt_id: Uuid::new_v4().to_string(),
            guest_id: run_tag.clone(),
            wedding_id: run_tag.clone(),
            recipient: format!("guest{}@example.com", i),
            subject: Some("Hi".into()),
            body: "Body".into(),
        }).expect("email jobs are queued");
        job.execute_at = now - Duration::minutes(1) + Duration::milliseconds(i as i64);
        repo.create(&job).await.unwrap();
    }

    let worker_count = 10;
    let mut set = JoinSet::new();

    for i in 0..worker_count {
        let repo_clone = repo.clone();
        set.spawn(async move {
            let mut claimed_jobs = Vec::new();
            let mut empty_streaks = 0;

            while empty_streaks < 10 {
                let batch = repo_clone.find_pending(5).await.expect("Failed to fetch jobs");
                if batch.is_empty() {
                    empty_streaks += 1;
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                } else {
                    empty_streaks = 0;
                    for job in batch {
                        claimed_jobs.push(job);
                    }
                }
            }
            println!("Worker {} claimed {} jobs", i, claimed_jobs.len());
            claimed_jobs
        });
    }

    let mut all_claimed_ids = Vec::new();
    while let Some(res) = set.join_next().await {
        let worker_claimed = res.unwrap();
        all_claimed_ids.extend(
            worker_claimed
                .into_iter()
                .filter(|job| job.payload.guest_id == run_tag)
                .map(|job| job.id),
        );
    }

    let unique_ids: HashSet<String> = all_claimed_ids.iter().cloned().collect();
    assert_eq!(unique_ids.len(), all_claimed_ids.len(), "Duplicate jobs detected! Race condition exists.");
    assert_eq!(all_claimed_ids.len(), total_jobs, "Not all jobs were processed");

    sqlx::query("DELETE FROM jobs WHERE payload->>'guest_id' = $1")
        .bind(&run_tag)
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_parallel_reminders_on_postgres() {
    let Some(pool) = postgres_pool().await else { return };
    let state = Arc::new(assemble_state(
        &test_config(),
        Repositories::postgres(pool),
        Arc::new(NullProvider),
        Arc::new(NullProvider),
    ));

    let wedding = state.lifecycle.create_wedding(NewWedding {
        slug: format!("pg-{}", Uuid::new_v4()),
        couple_names: "Ana & Rui".into(),
        wedding_date: None,
        timezone: None,
        default_rsvp_deadline: Some(Utc::now() + Duration::days(30)),
    }).await.unwrap();
    let guest = state.lifecycle.add_guest(&wedding.id, NewGuest {
        name: "Postgres Guest".into(),
        phone: Some("+258841234567".into()),
        email: None,
        companions: 0,
        table_name: None,
        rsvp_deadline: None,
    }).await.unwrap();

    let total = 64;
    let mut set = JoinSet::new();
    for _ in 0..total {
        let state = state.clone();
        let guest_id = guest.id.clone();
        set.spawn(async move {
            state.lifecycle.send_reminder(&guest_id, Channel::Whatsapp, &Value::Null, Utc::now()).await
        });
    }
    while let Some(res) = set.join_next().await {
        res.unwrap().expect("reminder failed");
    }

    let stored = state.lifecycle.get_guest(&guest.id).await.unwrap();
    assert_eq!(stored.reminder_count, total);
}
