//! RSVP state machine.
//!
//! ```text
//! pending ──► confirmed ◄──► rejected
//!                 │
//!                 ▼
//!            checked_in
//! ```
//!
//! Moves into `confirmed`/`rejected` are gated by the guest's RSVP deadline
//! (inclusive at the boundary). Check-in ignores the deadline but requires a
//! prior confirmation. Re-entering the current status is a no-op.

use chrono::{DateTime, Utc};

use crate::domain::models::guest::{Guest, GuestStatus};
use crate::error::AppError;

pub fn is_allowed(from: GuestStatus, to: GuestStatus) -> bool {
    use GuestStatus::*;
    from == to
        || matches!(
            (from, to),
            (Pending, Confirmed)
                | (Pending, Rejected)
                | (Confirmed, Rejected)
                | (Rejected, Confirmed)
                | (Confirmed, CheckedIn)
        )
}

fn check_deadline(guest: &Guest, now: DateTime<Utc>) -> Result<(), AppError> {
    match guest.rsvp_deadline {
        Some(deadline) if now > deadline => Err(AppError::DeadlineExpired(deadline)),
        _ => Ok(()),
    }
}

/// Applies `target` to a copy of `guest`, evaluated at `now`.
pub fn transition(guest: &Guest, target: GuestStatus, now: DateTime<Utc>) -> Result<Guest, AppError> {
    if guest.status == target {
        return Ok(guest.clone());
    }

    if !is_allowed(guest.status, target) {
        return Err(AppError::InvalidTransition { from: guest.status, to: target });
    }

    let mut next = guest.clone();
    match target {
        GuestStatus::Confirmed | GuestStatus::Rejected => {
            check_deadline(guest, now)?;
            next.responded_at = Some(now);
        }
        GuestStatus::CheckedIn => {
            next.checked_in_at = Some(now);
        }
        GuestStatus::Pending => {
            return Err(AppError::InvalidTransition { from: guest.status, to: target });
        }
    }
    next.status = target;
    Ok(next)
}
