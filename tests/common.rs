use rsvp_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::{guest::Guest, wedding::Wedding},
    domain::ports::ChannelProvider,
    domain::services::lifecycle::{LifecycleService, NewGuest, NewWedding},
    infra::factory::{assemble_state, Repositories},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use std::str::FromStr;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tower::ServiceExt;
use serde_json::Value;

/// One message handed to a provider.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
}

/// Channel provider that records every delivery, optionally failing them.
#[derive(Default)]
pub struct RecordingProvider {
    pub sent: Mutex<Vec<SentMessage>>,
    pub fail: bool,
}

#[allow(dead_code)]
impl RecordingProvider {
    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: true }
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelProvider for RecordingProvider {
    async fn send(&self, recipient: &str, subject: Option<&str>, body: &str) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::InternalWithMsg("gateway unavailable".into()));
        }
        self.sent.lock().unwrap().push(SentMessage {
            recipient: recipient.to_string(),
            subject: subject.map(str::to_string),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub email: Arc<RecordingProvider>,
    pub sms: Arc<RecordingProvider>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_providers(RecordingProvider::default(), RecordingProvider::default()).await
    }

    pub async fn with_providers(email: RecordingProvider, sms: RecordingProvider) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            public_base_url: "https://rsvp.test".to_string(),
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            sms_service_url: "http://localhost".to_string(),
            sms_service_token: "token".to_string(),
            default_country_code: Some("258".to_string()),
            max_update_retries: 20,
        };

        let email = Arc::new(email);
        let sms = Arc::new(sms);
        let state = Arc::new(assemble_state(
            &config,
            Repositories::sqlite(pool.clone()),
            email.clone(),
            sms.clone(),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            email,
            sms,
        }
    }

    pub fn lifecycle(&self) -> &LifecycleService {
        &self.state.lifecycle
    }

    pub async fn create_wedding(&self, slug: &str) -> Wedding {
        self.lifecycle().create_wedding(NewWedding {
            slug: slug.to_string(),
            couple_names: "Ana & Rui".to_string(),
            wedding_date: None,
            timezone: Some("Africa/Maputo".to_string()),
            default_rsvp_deadline: None,
        }).await.expect("Failed to create wedding")
    }

    pub async fn add_guest(
        &self,
        wedding_id: &str,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        rsvp_deadline: Option<DateTime<Utc>>,
    ) -> Guest {
        self.lifecycle().add_guest(wedding_id, NewGuest {
            name: name.to_string(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            companions: 0,
            table_name: None,
            rsvp_deadline,
        }).await.expect("Failed to add guest")
    }

    /// Drives the real router and returns status plus JSON body.
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
