use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::AppError;

pub const DEFAULT_SUBJECT: &str = "General Inquiry";

/// Contact form payload as posted by the site. Every field is optional at
/// this layer so a missing field surfaces as a validation error rather
/// than a body parse failure.
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct ContactForm {
    #[serde(default)]
    #[validate(required, custom(function = "not_blank"))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(required, custom(function = "not_blank"))]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    #[validate(required, custom(function = "not_blank"))]
    pub message: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// A submission whose required fields are known to be present.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Checks the required fields and fills in defaults for the optional ones.
    pub fn validate_submission(self) -> Result<Submission, AppError> {
        self.validate()?;

        let required = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();
        let optional = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Submission {
            name: required(self.name),
            email: required(self.email),
            phone: optional(self.phone),
            subject: optional(self.subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            message: self.message.unwrap_or_default(),
        })
    }
}
