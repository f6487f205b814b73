use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;
use zeroize::Zeroizing;

use crate::{
    constants::{CONTACT_LIMIT_MESSAGE, GLOBAL_LIMIT_MESSAGE},
    limiter::rate_limiter::RateLimitPolicy,
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default)]
    pub trust_x_forwarded_for: bool,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub resend_api_key: String,

    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,

    #[serde(default = "default_mail_from")]
    pub mail_from: String,

    #[serde(default = "default_mail_to")]
    pub mail_to: String,

    #[serde(default)]
    pub google_sheet_id: Option<String>,

    #[serde(default)]
    pub google_service_account_email: Option<String>,

    #[serde(default)]
    pub google_private_key: Option<String>,

    #[serde(default = "default_google_token_uri")]
    pub google_token_uri: String,

    #[serde(default = "default_sheets_api_url")]
    pub sheets_api_url: String,

    #[serde(default = "default_global_max")]
    pub global_rate_limit_max: u64,

    #[serde(default = "default_global_window")]
    pub global_rate_limit_window_secs: u64,

    #[serde(default = "default_contact_max")]
    pub contact_rate_limit_max: u64,

    #[serde(default = "default_contact_window")]
    pub contact_rate_limit_window_secs: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Contact-Relay".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_static_dir() -> String {
    ".".to_string()
}
fn default_http_timeout() -> u64 {
    10
}
fn default_resend_api_url() -> String {
    "https://api.resend.com".to_string()
}
fn default_mail_from() -> String {
    "SR Trading Contact <onboarding@resend.dev>".to_string()
}
fn default_mail_to() -> String {
    "anujd300@gmail.com".to_string()
}
fn default_google_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}
fn default_sheets_api_url() -> String {
    "https://sheets.googleapis.com".to_string()
}
fn default_global_max() -> u64 {
    100
}
fn default_global_window() -> u64 {
    15 * 60
}
fn default_contact_max() -> u64 {
    5
}
fn default_contact_window() -> u64 {
    60 * 60
}

/// Credentials for the optional spreadsheet log. Only built when every
/// piece is present.
#[derive(Clone)]
pub struct SheetCredentials {
    pub sheet_id: String,
    pub service_account_email: String,
    pub private_key: Zeroizing<String>,
    pub token_uri: String,
    pub api_url: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Hosting platforms and provider docs use the bare names
        if config.resend_api_key.trim().is_empty() {
            config.resend_api_key = env::var("RESEND_API_KEY").unwrap_or_default();
        }
        if let Ok(port) = env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::Message(format!("Invalid PORT value: {}", port)))?;
        }
        fill_from_env(&mut config.google_sheet_id, "GOOGLE_SHEET_ID");
        fill_from_env(&mut config.google_service_account_email, "GOOGLE_SERVICE_ACCOUNT_EMAIL");
        fill_from_env(&mut config.google_private_key, "GOOGLE_PRIVATE_KEY");

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.mail_to.trim().is_empty() {
            errors.push("MAIL_TO cannot be empty");
        }
        if self.mail_from.trim().is_empty() {
            errors.push("MAIL_FROM cannot be empty");
        }
        if self.global_rate_limit_max == 0 || self.global_rate_limit_window_secs == 0 {
            errors.push("Global rate limit must allow at least one request per non-empty window");
        }
        if self.contact_rate_limit_max == 0 || self.contact_rate_limit_window_secs == 0 {
            errors.push("Contact rate limit must allow at least one request per non-empty window");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }
        if Url::parse(&self.resend_api_url).is_err() {
            errors.push("RESEND_API_URL must be an absolute URL");
        }
        if Url::parse(&self.sheets_api_url).is_err() || Url::parse(&self.google_token_uri).is_err() {
            errors.push("Google API endpoints must be absolute URLs");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn global_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(
            self.global_rate_limit_max,
            Duration::from_secs(self.global_rate_limit_window_secs),
            GLOBAL_LIMIT_MESSAGE,
        )
    }

    pub fn contact_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(
            self.contact_rate_limit_max,
            Duration::from_secs(self.contact_rate_limit_window_secs),
            CONTACT_LIMIT_MESSAGE,
        )
    }

    /// Returns the spreadsheet credentials when all three values are set.
    /// The private key usually arrives with literal `\n` escapes from the
    /// environment; they are turned back into newlines here.
    pub fn sheet_credentials(&self) -> Option<SheetCredentials> {
        let sheet_id = non_blank(&self.google_sheet_id)?;
        let service_account_email = non_blank(&self.google_service_account_email)?;
        let private_key = non_blank(&self.google_private_key)?;

        Some(SheetCredentials {
            sheet_id: sheet_id.to_string(),
            service_account_email: service_account_email.to_string(),
            private_key: Zeroizing::new(private_key.replace("\\n", "\n")),
            token_uri: self.google_token_uri.clone(),
            api_url: self.sheets_api_url.trim_end_matches('/').to_string(),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn fill_from_env(current: &mut Option<String>, env_key: &str) {
    if non_blank(current).is_none() {
        *current = env::var(env_key).ok();
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            cors_allowed_origins: default_cors_origins(),
            static_dir: default_static_dir(),
            trust_x_forwarded_for: false,
            http_timeout_secs: default_http_timeout(),
            resend_api_key: String::new(),
            resend_api_url: default_resend_api_url(),
            mail_from: default_mail_from(),
            mail_to: default_mail_to(),
            google_sheet_id: None,
            google_service_account_email: None,
            google_private_key: None,
            google_token_uri: default_google_token_uri(),
            sheets_api_url: default_sheets_api_url(),
            global_rate_limit_max: default_global_max(),
            global_rate_limit_window_secs: default_global_window(),
            contact_rate_limit_max: default_contact_max(),
            contact_rate_limit_window_secs: default_contact_window(),
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.trim().is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self {
            Some(value) => value.as_str().redact(),
            None => "[MISSING]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("static_dir", &self.static_dir)
            .field("trust_x_forwarded_for", &self.trust_x_forwarded_for)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("resend_api_key", &self.resend_api_key.redact())
            .field("resend_api_url", &self.resend_api_url)
            .field("mail_from", &self.mail_from)
            .field("mail_to", &self.mail_to)
            .field("google_sheet_id", &self.google_sheet_id)
            .field("google_service_account_email", &self.google_service_account_email)
            .field("google_private_key", &self.google_private_key.redact())
            .field("global_rate_limit_max", &self.global_rate_limit_max)
            .field("global_rate_limit_window_secs", &self.global_rate_limit_window_secs)
            .field("contact_rate_limit_max", &self.contact_rate_limit_max)
            .field("contact_rate_limit_window_secs", &self.contact_rate_limit_window_secs)
            .finish()
    }
}

impl fmt::Debug for SheetCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetCredentials")
            .field("sheet_id", &self.sheet_id)
            .field("service_account_email", &self.service_account_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .field("api_url", &self.api_url)
            .finish()
    }
}
