use std::sync::Arc;

use chrono_tz::Tz;
use reqwest::Url;
use serde_json::{json, Map, Value};
use tera::{Context, Tera};

use crate::domain::models::{
    guest::Guest,
    notification::{Channel, NotificationKind},
    wedding::Wedding,
};
use crate::domain::services::templates::template_for;
use crate::error::AppError;

const MIN_PHONE_DIGITS: usize = 10; // 1-digit country code + 9
const MAX_PHONE_DIGITS: usize = 18; // 3-digit country code + 15

/// Outcome of the pure composition step. Nothing has been sent or counted yet.
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    pub channel: Channel,
    pub kind: NotificationKind,
    pub recipient: String,
    pub template_id: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub whatsapp_mobile_url: Option<String>,
    pub whatsapp_web_url: Option<String>,
}

/// Normalizes a phone number to `+<country code><digits>`.
///
/// Spaces, dashes, dots and parentheses are ignored and a leading `00` is read
/// as `+`. A bare number gets `default_country_code` prepended unless it
/// already starts with it; a single leading trunk `0` is dropped first.
pub fn normalize_phone(raw: &str, default_country_code: Option<&str>) -> Result<String, AppError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
        .collect();

    if compact.is_empty() {
        return Err(AppError::InvalidRecipient("guest has no phone number".into()));
    }

    let digits = if let Some(rest) = compact.strip_prefix('+') {
        rest.to_string()
    } else if let Some(rest) = compact.strip_prefix("00") {
        rest.to_string()
    } else {
        let local = compact.strip_prefix('0').unwrap_or(&compact);
        match default_country_code {
            Some(cc) if !local.starts_with(cc) => format!("{}{}", cc, local),
            _ => local.to_string(),
        }
    };

    if !digits.chars().all(|c| c.is_ascii_digit())
        || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len())
    {
        return Err(AppError::InvalidRecipient(format!("malformed phone number '{}'", raw)));
    }

    Ok(format!("+{}", digits))
}

pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email.to_string()),
        _ if email.is_empty() => Err(AppError::InvalidRecipient("guest has no email address".into())),
        _ => Err(AppError::InvalidRecipient(format!("malformed email address '{}'", email))),
    }
}

/// Contact value as stored, for the audit trail of failed attempts.
pub fn raw_recipient(guest: &Guest, channel: Channel) -> String {
    let value = if channel.uses_phone() { &guest.phone } else { &guest.email };
    value.clone().unwrap_or_default()
}

pub fn check_supported(channel: Channel, kind: NotificationKind) -> Result<(), AppError> {
    if kind == NotificationKind::DeliveryAck && channel != Channel::Whatsapp {
        return Err(AppError::InvalidChannel(format!(
            "{} is only recorded for whatsapp, not {}",
            kind, channel
        )));
    }
    Ok(())
}

/// Mobile (`wa.me`) and web deep links carrying `body` as the prefilled text.
pub fn whatsapp_links(phone: &str, body: &str) -> Result<(String, String), AppError> {
    let digits = phone.trim_start_matches('+');

    let mut mobile = Url::parse(&format!("https://wa.me/{}", digits))
        .map_err(|e| AppError::InternalWithMsg(format!("Invalid WhatsApp URL: {}", e)))?;
    mobile.query_pairs_mut().append_pair("text", body);

    let mut web = Url::parse("https://web.whatsapp.com/send")
        .map_err(|e| AppError::InternalWithMsg(format!("Invalid WhatsApp URL: {}", e)))?;
    web.query_pairs_mut()
        .append_pair("phone", digits)
        .append_pair("text", body);

    // form encoding writes spaces as '+', WhatsApp expects %20; literal '+' is already %2B
    Ok((
        mobile.to_string().replace('+', "%20"),
        web.to_string().replace('+', "%20"),
    ))
}

fn render_error(e: tera::Error) -> AppError {
    let mut msg = e.to_string();
    let mut source = std::error::Error::source(&e);
    while let Some(inner) = source {
        msg.push_str(": ");
        msg.push_str(&inner.to_string());
        source = inner.source();
    }
    AppError::TemplateRender(msg)
}

pub struct Dispatcher {
    templates: Arc<Tera>,
    public_base_url: String,
    default_country_code: Option<String>,
}

impl Dispatcher {
    pub fn new(templates: Arc<Tera>, public_base_url: String, default_country_code: Option<String>) -> Self {
        Self {
            templates,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            default_country_code,
        }
    }

    /// Personalized invitation page. Falls back to the token link for guests
    /// that have no slug yet.
    pub fn invitation_url(&self, wedding: &Wedding, guest: &Guest) -> String {
        match &guest.unique_slug {
            Some(slug) => format!("{}/{}/invite/{}", self.public_base_url, wedding.slug, slug),
            None => format!("{}/rsvp/{}", self.public_base_url, guest.token),
        }
    }

    pub fn resolve_recipient(&self, guest: &Guest, channel: Channel) -> Result<String, AppError> {
        if channel.uses_phone() {
            normalize_phone(guest.phone.as_deref().unwrap_or(""), self.default_country_code.as_deref())
        } else {
            normalize_email(guest.email.as_deref().unwrap_or(""))
        }
    }

    /// Defaults derived from the guest and wedding, overlaid with the caller's
    /// `template_data` object.
    pub fn build_context(&self, guest: &Guest, wedding: &Wedding, template_data: &Value) -> Result<Context, AppError> {
        let tz: Tz = wedding.timezone.parse().unwrap_or(chrono_tz::UTC);

        let mut data = Map::new();
        data.insert("guest_name".into(), json!(guest.name));
        data.insert("couple_names".into(), json!(wedding.couple_names));
        data.insert("invitation_url".into(), json!(self.invitation_url(wedding, guest)));
        data.insert("companions".into(), json!(guest.companions));
        if let Some(table) = &guest.table_name {
            data.insert("table_name".into(), json!(table));
        }
        if let Some(deadline) = guest.rsvp_deadline {
            let local = deadline.with_timezone(&tz);
            data.insert("rsvp_deadline".into(), json!(local.format("%d/%m/%Y %H:%M").to_string()));
        }
        if let Some(date) = wedding.wedding_date {
            let local = date.with_timezone(&tz);
            data.insert("wedding_date".into(), json!(local.format("%d/%m/%Y").to_string()));
        }

        match template_data {
            Value::Null => {}
            Value::Object(extra) => {
                for (key, value) in extra {
                    data.insert(key.clone(), value.clone());
                }
            }
            _ => return Err(AppError::TemplateRender("template data must be a JSON object".into())),
        }

        Context::from_value(Value::Object(data)).map_err(render_error)
    }

    pub fn compose(
        &self,
        guest: &Guest,
        wedding: &Wedding,
        channel: Channel,
        kind: NotificationKind,
        template_data: &Value,
    ) -> Result<ComposedMessage, AppError> {
        check_supported(channel, kind)?;
        let recipient = self.resolve_recipient(guest, channel)?;

        let mut composed = ComposedMessage {
            channel,
            kind,
            recipient,
            template_id: None,
            subject: None,
            body: None,
            whatsapp_mobile_url: None,
            whatsapp_web_url: None,
        };

        let Some((body_template, subject_template)) = template_for(channel, kind) else {
            return Ok(composed);
        };

        let context = self.build_context(guest, wedding, template_data)?;
        let body = self.templates.render(body_template, &context).map_err(render_error)?;
        let subject = subject_template
            .map(|name| self.templates.render(name, &context).map_err(render_error))
            .transpose()?
            .map(|s| s.trim().to_string());

        if channel == Channel::Whatsapp {
            let (mobile, web) = whatsapp_links(&composed.recipient, body.trim())?;
            composed.whatsapp_mobile_url = Some(mobile);
            composed.whatsapp_web_url = Some(web);
        }

        composed.template_id = Some(body_template.to_string());
        composed.subject = subject;
        composed.body = Some(body.trim().to_string());
        Ok(composed)
    }
}
