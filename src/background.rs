use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::state::AppState;
use crate::domain::models::job::{Job, JOB_DELIVER_EMAIL, JOB_DELIVER_SMS};
use crate::error::AppError;

const BATCH_SIZE: i32 = 10;
const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background delivery worker...");

    loop {
        if let Err(e) = process_pending_jobs(&state).await {
            error!("Failed to fetch pending jobs: {:?}", e);
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// One polling round: claims up to a batch of due jobs and hands each to its
/// provider. Returns how many jobs were claimed.
pub async fn process_pending_jobs(state: &AppState) -> Result<usize, AppError> {
    let jobs = state.job_repo.find_pending(BATCH_SIZE).await?;
    let claimed = jobs.len();

    for job in jobs {
        let span = info_span!(
            "delivery_job",
            job_id = %job.id,
            job_type = %job.job_type,
            guest_id = %job.payload.guest_id,
            attempt_id = %job.payload.attempt_id
        );

        async {
            info!("Processing job: {}", job.job_type);
            match deliver(state, &job).await {
                Ok(_) => {
                    info!("Job completed successfully");
                    if let Err(e) = state.job_repo.update_status(&job.id, "COMPLETED", None).await {
                        error!("Failed to mark job as completed: {:?}", e);
                    }
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    error!("Job failed with error: {}", err_msg);
                    if let Err(up_err) = state.job_repo.update_status(&job.id, "FAILED", Some(err_msg)).await {
                        error!("Failed to mark job as failed: {:?}", up_err);
                    }
                }
            }
        }
            .instrument(span)
            .await;
    }

    Ok(claimed)
}

async fn deliver(state: &AppState, job: &Job) -> Result<(), AppError> {
    let provider = match job.job_type.as_str() {
        JOB_DELIVER_EMAIL => &state.email_provider,
        JOB_DELIVER_SMS => &state.sms_provider,
        other => return Err(AppError::InternalWithMsg(format!("Unknown job type {}", other))),
    };

    let payload = &job.payload;
    provider
        .send(&payload.recipient, payload.subject.as_deref(), &payload.body)
        .await
}
