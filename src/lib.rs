use std::path::PathBuf;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, middlewares, repositories, routes};
pub use infrastructure::{limiter, mail, sheets, utils};

use entities::email::MailIdentity;
use limiter::rate_limiter::RateLimiterStore;
use mail::resend::ResendMailer;
use sheets::google::GoogleSheetsRecorder;
use use_cases::contact::ContactHandler;

pub struct AppState {
    pub contact_handler: AppContactHandler,
    pub global_limiter: RateLimiterStore,
    pub contact_limiter: RateLimiterStore,
    pub static_dir: PathBuf,
    pub trust_x_forwarded_for: bool,
}

pub type AppContactHandler = ContactHandler<ResendMailer, GoogleSheetsRecorder>;

impl AppState {
    pub fn new(config: &settings::AppConfig) -> anyhow::Result<Self> {
        let mailer = ResendMailer::from_config(config)?;

        let recorder = match config.sheet_credentials() {
            Some(credentials) => {
                tracing::info!(sheet_id = %credentials.sheet_id, "Spreadsheet logging enabled");
                Some(GoogleSheetsRecorder::new(credentials, config.http_timeout())?)
            }
            None => {
                tracing::info!("Spreadsheet credentials not configured, submissions will only be emailed");
                None
            }
        };

        if config.resend_api_key.trim().is_empty() {
            tracing::warn!("RESEND_API_KEY is not set, email dispatch will fail");
        }

        let identity = MailIdentity {
            from: config.mail_from.clone(),
            to: config.mail_to.clone(),
        };

        Ok(AppState {
            contact_handler: ContactHandler::new(mailer, recorder, identity),
            global_limiter: RateLimiterStore::new(config.global_policy()),
            contact_limiter: RateLimiterStore::new(config.contact_policy()),
            static_dir: PathBuf::from(&config.static_dir),
            trust_x_forwarded_for: config.trust_x_forwarded_for,
        })
    }
}
