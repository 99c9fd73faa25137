use std::sync::Arc;
use crate::domain::ports::{ChannelProvider, JobRepository};
use crate::domain::services::lifecycle::LifecycleService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub lifecycle: Arc<LifecycleService>,
    pub job_repo: Arc<dyn JobRepository>,
    pub email_provider: Arc<dyn ChannelProvider>,
    pub sms_provider: Arc<dyn ChannelProvider>,
}
