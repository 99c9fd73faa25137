use tera::Tera;

use crate::domain::models::notification::{Channel, NotificationKind};

pub const INVITE_SUBJECT: &str = "You are invited: {{ couple_names }}";
pub const REMINDER_SUBJECT: &str = "Reminder: please answer {{ couple_names }}";
pub const CONFIRMATION_SUBJECT: &str = "Confirmed: wedding of {{ couple_names }}";

const MESSAGE_TEMPLATES: [(&str, &str); 3] = [
    ("invite.txt", include_str!("../../../templates/messages/invite.txt")),
    ("reminder.txt", include_str!("../../../templates/messages/reminder.txt")),
    ("confirmation.txt", include_str!("../../../templates/messages/confirmation.txt")),
];

const EMAIL_TEMPLATES: [(&str, &str); 3] = [
    ("invite_email.html", include_str!("../../../templates/email/invite.html")),
    ("reminder_email.html", include_str!("../../../templates/email/reminder.html")),
    ("confirmation_email.html", include_str!("../../../templates/email/confirmation.html")),
];

const SUBJECT_TEMPLATES: [(&str, &str); 3] = [
    ("invite_subject.txt", INVITE_SUBJECT),
    ("reminder_subject.txt", REMINDER_SUBJECT),
    ("confirmation_subject.txt", CONFIRMATION_SUBJECT),
];

/// Registers every bundled template.
pub fn build_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(
        MESSAGE_TEMPLATES
            .iter()
            .chain(EMAIL_TEMPLATES.iter())
            .chain(SUBJECT_TEMPLATES.iter())
            .copied(),
    )?;
    Ok(tera)
}

/// Body template and optional subject template for a channel/kind pair.
/// `None` when the kind carries no message.
pub fn template_for(channel: Channel, kind: NotificationKind) -> Option<(&'static str, Option<&'static str>)> {
    let pair = match (channel, kind) {
        (_, NotificationKind::DeliveryAck) => return None,
        (Channel::Email, NotificationKind::Invite) => ("invite_email.html", Some("invite_subject.txt")),
        (Channel::Email, NotificationKind::Reminder) => ("reminder_email.html", Some("reminder_subject.txt")),
        (Channel::Email, NotificationKind::ManualConfirm) => ("confirmation_email.html", Some("confirmation_subject.txt")),
        (_, NotificationKind::Invite) => ("invite.txt", None),
        (_, NotificationKind::Reminder) => ("reminder.txt", None),
        (_, NotificationKind::ManualConfirm) => ("confirmation.txt", None),
    };
    Some(pair)
}
