pub mod mailer;
pub mod recorder;
