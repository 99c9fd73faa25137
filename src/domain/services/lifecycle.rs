use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::domain::models::{
    guest::{Guest, GuestStatus, NewGuestParams, MAX_COMPANIONS},
    job::{DeliveryPayload, Job},
    notification::{Channel, NotificationAttempt, NotificationKind},
    table::{Table, TableRoster},
    wedding::Wedding,
};
use crate::domain::ports::{
    GuestRepository, JobRepository, NotificationAuditSink, TableRepository, WeddingRepository,
};
use crate::domain::services::{
    check_in,
    dispatcher::{raw_recipient, ComposedMessage, Dispatcher},
    rsvp, seating,
    token_issuer::{TokenIssuer, MAX_SLUG_ATTEMPTS},
};
use crate::error::AppError;

pub const DEFAULT_MAX_RETRIES: usize = 10;

pub struct NewWedding {
    pub slug: String,
    pub couple_names: String,
    pub wedding_date: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub default_rsvp_deadline: Option<DateTime<Utc>>,
}

pub struct NewGuest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub companions: i32,
    pub table_name: Option<String>,
    pub rsvp_deadline: Option<DateTime<Utc>>,
}

/// Partial edit of guest details. Empty strings clear phone/email.
#[derive(Default)]
pub struct GuestUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub companions: Option<i32>,
    pub rsvp_deadline: Option<DateTime<Utc>>,
    pub clear_rsvp_deadline: bool,
}

#[derive(Debug, Serialize)]
pub struct DispatchResult {
    pub guest: Guest,
    pub attempt: NotificationAttempt,
    pub message: Option<String>,
    pub whatsapp_mobile_url: Option<String>,
    pub whatsapp_web_url: Option<String>,
}

pub struct LifecycleDeps {
    pub weddings: Arc<dyn WeddingRepository>,
    pub guests: Arc<dyn GuestRepository>,
    pub tables: Arc<dyn TableRepository>,
    pub audit: Arc<dyn NotificationAuditSink>,
    pub jobs: Arc<dyn JobRepository>,
    pub dispatcher: Dispatcher,
    pub max_retries: usize,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_companions(companions: i32) -> Result<(), AppError> {
    if !(0..=MAX_COMPANIONS).contains(&companions) {
        return Err(AppError::Validation(format!(
            "Companions must be between 0 and {}",
            MAX_COMPANIONS
        )));
    }
    Ok(())
}

/// Single entry point for every guest mutation.
pub struct LifecycleService {
    weddings: Arc<dyn WeddingRepository>,
    guests: Arc<dyn GuestRepository>,
    tables: Arc<dyn TableRepository>,
    audit: Arc<dyn NotificationAuditSink>,
    jobs: Arc<dyn JobRepository>,
    dispatcher: Dispatcher,
    issuer: TokenIssuer,
    max_retries: usize,
}

impl LifecycleService {
    pub fn new(deps: LifecycleDeps) -> Self {
        Self {
            issuer: TokenIssuer::new(deps.guests.clone()),
            weddings: deps.weddings,
            guests: deps.guests,
            tables: deps.tables,
            audit: deps.audit,
            jobs: deps.jobs,
            dispatcher: deps.dispatcher,
            max_retries: deps.max_retries.max(1),
        }
    }

    // --- weddings -------------------------------------------------------

    pub async fn create_wedding(&self, new: NewWedding) -> Result<Wedding, AppError> {
        let slug = new.slug.trim().to_lowercase();
        if slug.is_empty() || !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(AppError::Validation("Wedding slug must use letters, digits and hyphens".into()));
        }
        let couple_names = new.couple_names.trim().to_string();
        if couple_names.is_empty() {
            return Err(AppError::Validation("Couple names are required".into()));
        }
        let timezone = new.timezone.unwrap_or_else(|| "UTC".to_string());
        if timezone.parse::<Tz>().is_err() {
            return Err(AppError::Validation(format!("Unknown timezone '{}'", timezone)));
        }

        let mut wedding = Wedding::new(slug, couple_names, timezone);
        wedding.wedding_date = new.wedding_date;
        wedding.default_rsvp_deadline = new.default_rsvp_deadline;

        match self.weddings.create(&wedding).await {
            Ok(created) => {
                info!("Wedding created: {} ({})", created.id, created.slug);
                Ok(created)
            }
            Err(e) if e.is_unique_violation() => Err(AppError::Conflict("Wedding slug already taken".into())),
            Err(e) => Err(e),
        }
    }

    pub async fn get_wedding(&self, id: &str) -> Result<Wedding, AppError> {
        self.weddings.find_by_id(id).await?
            .ok_or(AppError::NotFound("Wedding not found".into()))
    }

    // --- guests ---------------------------------------------------------

    pub async fn add_guest(&self, wedding_id: &str, new: NewGuest) -> Result<Guest, AppError> {
        let wedding = self.get_wedding(wedding_id).await?;

        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Guest name is required".into()));
        }
        validate_companions(new.companions)?;

        let phone = non_empty(new.phone);
        let email = non_empty(new.email);
        let table_name = seating::normalize_table_name(new.table_name.as_deref());
        let rsvp_deadline = new.rsvp_deadline.or(wedding.default_rsvp_deadline);

        for _ in 0..MAX_SLUG_ATTEMPTS {
            let slug = self.issuer.issue_unique_slug(&name, &wedding.id).await?;
            let guest = Guest::new(NewGuestParams {
                wedding_id: wedding.id.clone(),
                token: self.issuer.issue_token(),
                unique_slug: Some(slug),
                name: name.clone(),
                phone: phone.clone(),
                email: email.clone(),
                companions: new.companions,
                table_name: table_name.clone(),
                rsvp_deadline,
            });

            match self.guests.create(&guest).await {
                Ok(created) => {
                    info!("Guest {} added to wedding {}", created.id, wedding.id);
                    return Ok(created);
                }
                Err(e) if e.is_unique_violation() => {
                    warn!("Credential collision while adding guest to wedding {}, retrying", wedding.id);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::SlugGenerationExhausted(MAX_SLUG_ATTEMPTS))
    }

    pub async fn get_guest(&self, id: &str) -> Result<Guest, AppError> {
        self.guests.find(id).await?
            .ok_or(AppError::NotFound("Guest not found".into()))
    }

    pub async fn get_guest_by_token(&self, token: &str) -> Result<Guest, AppError> {
        self.guests.find_by_token(token).await?
            .ok_or(AppError::NotFound("Invalid invitation link".into()))
    }

    pub async fn get_guest_by_slug(&self, wedding_slug: &str, slug: &str) -> Result<Guest, AppError> {
        let wedding = self.weddings.find_by_slug(wedding_slug).await?
            .ok_or(AppError::NotFound("Invalid invitation link".into()))?;
        self.guests.find_by_slug(&wedding.id, slug).await?
            .ok_or(AppError::NotFound("Invalid invitation link".into()))
    }

    pub async fn list_guests(&self, wedding_id: &str) -> Result<Vec<Guest>, AppError> {
        self.get_wedding(wedding_id).await?;
        self.guests.list_by_wedding(wedding_id).await
    }

    pub async fn update_guest(&self, id: &str, update: GuestUpdate) -> Result<Guest, AppError> {
        if let Some(name) = &update.name
            && name.trim().is_empty()
        {
            return Err(AppError::Validation("Guest name is required".into()));
        }
        if let Some(companions) = update.companions {
            validate_companions(companions)?;
        }

        self.atomic_update(id, |g| {
            if let Some(name) = &update.name {
                g.name = name.trim().to_string();
            }
            if let Some(phone) = &update.phone {
                g.phone = non_empty(Some(phone.clone()));
            }
            if let Some(email) = &update.email {
                g.email = non_empty(Some(email.clone()));
            }
            if let Some(companions) = update.companions {
                g.companions = companions;
            }
            if update.clear_rsvp_deadline {
                g.rsvp_deadline = None;
            } else if let Some(deadline) = update.rsvp_deadline {
                g.rsvp_deadline = Some(deadline);
            }
            Ok(())
        }).await
    }

    // --- rsvp -----------------------------------------------------------

    /// Public RSVP answer. The deadline is evaluated against `now` on every
    /// retry, i.e. at the time the write is applied.
    pub async fn confirm_or_reject(&self, token: &str, decision: GuestStatus, now: DateTime<Utc>) -> Result<Guest, AppError> {
        if !matches!(decision, GuestStatus::Confirmed | GuestStatus::Rejected) {
            return Err(AppError::Validation("Decision must be 'confirmed' or 'rejected'".into()));
        }
        let guest = self.get_guest_by_token(token).await?;
        let updated = self.apply_status(&guest.id, decision, now).await?;
        info!("Guest {} answered RSVP: {}", updated.id, updated.status);
        Ok(updated)
    }

    /// Organizer-side status change through the same state machine.
    pub async fn set_status(&self, id: &str, status: GuestStatus, now: DateTime<Utc>) -> Result<Guest, AppError> {
        let updated = self.apply_status(id, status, now).await?;
        info!("Guest {} status set to {} by organizer", updated.id, updated.status);
        Ok(updated)
    }

    async fn apply_status(&self, id: &str, status: GuestStatus, now: DateTime<Utc>) -> Result<Guest, AppError> {
        self.atomic_update(id, |g| {
            *g = rsvp::transition(g, status, now)?;
            Ok(())
        }).await
    }

    // --- notifications --------------------------------------------------

    pub async fn send_invite(&self, id: &str, channel: Channel, template_data: &Value, now: DateTime<Utc>) -> Result<DispatchResult, AppError> {
        self.dispatch(id, channel, NotificationKind::Invite, template_data, now).await
    }

    pub async fn send_reminder(&self, id: &str, channel: Channel, template_data: &Value, now: DateTime<Utc>) -> Result<DispatchResult, AppError> {
        self.dispatch(id, channel, NotificationKind::Reminder, template_data, now).await
    }

    pub async fn send_confirmation(&self, id: &str, channel: Channel, template_data: &Value, now: DateTime<Utc>) -> Result<DispatchResult, AppError> {
        self.dispatch(id, channel, NotificationKind::ManualConfirm, template_data, now).await
    }

    /// Records a manually confirmed WhatsApp delivery.
    pub async fn mark_delivered(&self, id: &str, now: DateTime<Utc>) -> Result<DispatchResult, AppError> {
        self.dispatch(id, Channel::Whatsapp, NotificationKind::DeliveryAck, &Value::Null, now).await
    }

    /// Composes, counts and audits one notification. Every call that gets past
    /// guest lookup leaves exactly one audit entry; only successful calls move
    /// a counter. Email and SMS payloads are queued for the delivery worker.
    ///
    /// Once the counter has moved the dispatch is reported as successful, even
    /// if the audit row or delivery job could not be stored afterwards.
    pub async fn dispatch(
        &self,
        id: &str,
        channel: Channel,
        kind: NotificationKind,
        template_data: &Value,
        now: DateTime<Utc>,
    ) -> Result<DispatchResult, AppError> {
        let guest = self.get_guest(id).await?;

        let (guest, composed) = match self.prepare(guest.clone(), channel, kind, template_data).await {
            Ok(prepared) => prepared,
            Err(e) => {
                self.record_failure(&guest, channel, kind, &e).await;
                return Err(e);
            }
        };

        let sent_at = kind.is_send().then_some(now);
        let updated = match self.guests.increment_counter(&guest.id, kind.counter(), sent_at).await {
            Ok(updated) => updated,
            Err(e) => {
                self.record_failure(&guest, channel, kind, &e).await;
                return Err(e);
            }
        };

        let attempt = NotificationAttempt::sent(
            &guest.id,
            &guest.wedding_id,
            channel,
            kind,
            composed.recipient.clone(),
            composed.body.clone(),
            composed.template_id.clone(),
        );
        if let Err(e) = self.audit.append(&attempt).await {
            error!("Failed to record sent attempt {} for guest {}: {:?}", attempt.id, guest.id, e);
        }

        if let Some(body) = &composed.body {
            let payload = DeliveryPayload {
                attempt_id: attempt.id.clone(),
                guest_id: guest.id.clone(),
                wedding_id: guest.wedding_id.clone(),
                recipient: composed.recipient.clone(),
                subject: composed.subject.clone(),
                body: body.clone(),
            };
            if let Some(job) = Job::delivery(channel, payload) {
                match self.jobs.create(&job).await {
                    Ok(_) => debug!("Queued {} delivery job {} for guest {}", channel, job.id, guest.id),
                    Err(e) => error!(
                        "Failed to queue {} delivery for attempt {} (guest {}): {:?}",
                        channel, attempt.id, guest.id, e
                    ),
                }
            }
        }

        info!(
            guest_id = %guest.id,
            channel = %channel,
            kind = %kind,
            count = updated.counter(kind.counter()),
            "Notification dispatched"
        );

        Ok(DispatchResult {
            guest: updated,
            attempt,
            message: composed.body,
            whatsapp_mobile_url: composed.whatsapp_mobile_url,
            whatsapp_web_url: composed.whatsapp_web_url,
        })
    }

    /// Loads the wedding, backfills a missing slug and composes the message.
    async fn prepare(
        &self,
        mut guest: Guest,
        channel: Channel,
        kind: NotificationKind,
        template_data: &Value,
    ) -> Result<(Guest, ComposedMessage), AppError> {
        let wedding = self.weddings.find_by_id(&guest.wedding_id).await?
            .ok_or(AppError::NotFound("Wedding not found".into()))?;

        if kind.is_send() && guest.unique_slug.is_none() {
            guest = self.ensure_slug(&guest).await?;
        }

        let composed = self.dispatcher.compose(&guest, &wedding, channel, kind, template_data)?;
        Ok((guest, composed))
    }

    pub async fn list_notifications(&self, id: &str) -> Result<Vec<NotificationAttempt>, AppError> {
        self.get_guest(id).await?;
        self.audit.list_by_guest(id).await
    }

    /// Outbox jobs queued for a guest, newest first, with their delivery status.
    pub async fn list_deliveries(&self, id: &str) -> Result<Vec<Job>, AppError> {
        self.get_guest(id).await?;
        self.jobs.list_by_guest(id).await
    }

    async fn record_failure(&self, guest: &Guest, channel: Channel, kind: NotificationKind, err: &AppError) {
        warn!("Dispatch of {} via {} failed for guest {}: {}", kind, channel, guest.id, err);
        let attempt = NotificationAttempt::failed(
            &guest.id,
            &guest.wedding_id,
            channel,
            kind,
            raw_recipient(guest, channel),
            err.to_string(),
        );
        if let Err(audit_err) = self.audit.append(&attempt).await {
            error!("Failed to record failed attempt for guest {}: {:?}", guest.id, audit_err);
        }
    }

    async fn ensure_slug(&self, guest: &Guest) -> Result<Guest, AppError> {
        let slug = self.issuer.issue_unique_slug(&guest.name, &guest.wedding_id).await?;
        info!("Issuing missing slug for guest {}", guest.id);
        self.atomic_update(&guest.id, |g| {
            if g.unique_slug.is_none() {
                g.unique_slug = Some(slug.clone());
            }
            Ok(())
        }).await
    }

    // --- seating & check-in ---------------------------------------------

    pub async fn assign_seat(&self, id: &str, table: Option<&str>) -> Result<Guest, AppError> {
        let updated = self.atomic_update(id, |g| {
            seating::assign_table(g, table);
            Ok(())
        }).await?;
        info!("Guest {} seated at {:?}", updated.id, updated.table_name);
        Ok(updated)
    }

    /// Idempotent: concurrent or repeated calls all succeed and observe the
    /// first `checked_in_at`.
    pub async fn check_in(&self, id: &str, now: DateTime<Utc>) -> Result<Guest, AppError> {
        let updated = self.atomic_update(id, |g| {
            *g = check_in::check_in(g, now)?;
            Ok(())
        }).await?;
        info!("Guest {} checked in at {:?}", updated.id, updated.checked_in_at);
        Ok(updated)
    }

    pub async fn list_tables(&self, wedding_id: &str) -> Result<Vec<TableRoster>, AppError> {
        let guests = self.list_guests(wedding_id).await?;
        Ok(seating::derive_tables(&guests))
    }

    pub async fn bulk_create_tables(&self, wedding_id: &str) -> Result<Vec<Table>, AppError> {
        let guests = self.list_guests(wedding_id).await?;
        let capacities = seating::capacities_from_assignments(&guests);
        let tables = self.tables.upsert_many(wedding_id, &capacities).await?;
        info!("Upserted {} tables for wedding {}", tables.len(), wedding_id);
        Ok(tables)
    }

    // --- concurrency ----------------------------------------------------

    /// Optimistic read-modify-write: re-reads the row, re-applies `mutate`
    /// and retries on a stale version. An unchanged guest is not written.
    async fn atomic_update<F>(&self, id: &str, mut mutate: F) -> Result<Guest, AppError>
    where
        F: FnMut(&mut Guest) -> Result<(), AppError> + Send,
    {
        for attempt in 1..=self.max_retries {
            let current = self.get_guest(id).await?;
            let mut next = current.clone();
            mutate(&mut next)?;

            if next == current {
                return Ok(current);
            }

            next.updated_at = Utc::now();
            if let Some(saved) = self.guests.update_if_version(&next, current.version).await? {
                return Ok(saved);
            }
            warn!("Version conflict on guest {} (attempt {}/{})", id, attempt, self.max_retries);
        }

        Err(AppError::ConcurrencyConflict(format!(
            "guest {} changed concurrently {} times",
            id, self.max_retries
        )))
    }
}
