use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const GLOBAL_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";
pub const CONTACT_LIMIT_MESSAGE: &str = "Too many emails sent from this IP, please try again later.";
