use chrono::{DateTime, SecondsFormat, Utc};

use super::submission::Submission;

pub const SHEET_HEADERS: [&str; 6] = ["Date", "Name", "Email", "Phone", "Subject", "Message"];

/// One spreadsheet line: the submission plus the time it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub date: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl SheetRow {
    pub fn new(submission: &Submission, date: DateTime<Utc>) -> Self {
        SheetRow {
            date,
            name: submission.name.clone(),
            email: submission.email.clone(),
            phone: submission.phone.clone().unwrap_or_default(),
            subject: submission.subject.clone(),
            message: submission.message.clone(),
        }
    }

    /// Cell values in `SHEET_HEADERS` order.
    pub fn values(&self) -> Vec<String> {
        vec![
            self.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.subject.clone(),
            self.message.clone(),
        ]
    }
}
