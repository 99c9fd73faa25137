use std::env;

use crate::domain::services::lifecycle::DEFAULT_MAX_RETRIES;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub public_base_url: String, // Base of personalized invitation links
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub sms_service_url: String,
    pub sms_service_token: String,
    pub default_country_code: Option<String>,
    pub max_update_retries: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            sms_service_url: env::var("SMS_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8001/api/v1/sms".to_string()),
            sms_service_token: env::var("SMS_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            default_country_code: env::var("DEFAULT_COUNTRY_CODE").ok().filter(|cc| !cc.trim().is_empty()),
            max_update_retries: env::var("MAX_UPDATE_RETRIES")
                .map(|v| v.parse().expect("MAX_UPDATE_RETRIES must be a number"))
                .unwrap_or(DEFAULT_MAX_RETRIES),
        }
    }
}
