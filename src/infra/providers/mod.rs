pub mod http_email_service;
pub mod http_sms_service;
