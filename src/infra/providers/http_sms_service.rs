use crate::domain::ports::ChannelProvider;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Plain-text SMS gateway. Subjects are ignored.
pub struct HttpSmsService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpSmsService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct SmsPayload<'a> {
    to: &'a str,
    text: &'a str,
}

#[async_trait]
impl ChannelProvider for HttpSmsService {
    async fn send(&self, recipient: &str, _subject: Option<&str>, body: &str) -> Result<(), AppError> {
        let res = self.client.post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SmsPayload { to: recipient, text: body })
            .send()
            .await
            .map_err(|e| {
                let msg = format!("SMS gateway connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let msg = format!("SMS gateway rejected message. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
