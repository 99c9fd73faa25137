use chrono::{DateTime, Utc};

use crate::domain::models::guest::{Guest, GuestStatus};
use crate::domain::services::rsvp;
use crate::error::AppError;

/// Door check-in. A guest already checked in is returned unchanged, keeping
/// the first `checked_in_at`.
pub fn check_in(guest: &Guest, now: DateTime<Utc>) -> Result<Guest, AppError> {
    rsvp::transition(guest, GuestStatus::CheckedIn, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::guest::NewGuestParams;
    use chrono::Duration;

    #[test]
    fn test_second_check_in_keeps_first_stamp() {
        let mut g = Guest::new(NewGuestParams {
            wedding_id: "w1".into(),
            token: "t".into(),
            unique_slug: None,
            name: "Rui".into(),
            phone: None,
            email: None,
            companions: 0,
            table_name: None,
            rsvp_deadline: None,
        });
        g.status = GuestStatus::Confirmed;

        let first_at = Utc::now();
        let first = check_in(&g, first_at).unwrap();
        let second = check_in(&first, first_at + Duration::minutes(3)).unwrap();

        assert_eq!(second.status, GuestStatus::CheckedIn);
        assert_eq!(second.checked_in_at, Some(first_at));
    }
}
