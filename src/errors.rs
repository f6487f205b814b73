use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

pub const MISSING_FIELDS_MESSAGE: &str = "Please provide name, email and message";
pub const DISPATCH_FAILED_MESSAGE: &str = "Failed to send message. Please try again.";

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    InvalidBody(String),
    RateLimited(String),
    DispatchError(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InvalidBody(msg) => write!(f, "Invalid request body: {}", msg),
            AppError::RateLimited(msg) => write!(f, "{}", msg),
            AppError::DispatchError(msg) => write!(f, "Email dispatch failed: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

/// JSON envelope shared by every contact endpoint response.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub success: bool,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::RateLimited(msg) => response
                .insert_header(ContentType::plaintext())
                .body(msg.clone()),
            AppError::ValidationError(msg) => response.json(ErrorBody {
                success: false,
                message: msg,
                error: None,
            }),
            AppError::InvalidBody(detail) => response.json(ErrorBody {
                success: false,
                message: "Invalid request body",
                error: Some(detail),
            }),
            AppError::DispatchError(detail) => response.json(ErrorBody {
                success: false,
                message: DISPATCH_FAILED_MESSAGE,
                error: Some(detail),
            }),
            AppError::InternalError(detail) => response.json(ErrorBody {
                success: false,
                message: "Internal server error",
                error: Some(detail),
            }),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::DispatchError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(_: ValidationErrors) -> Self {
        AppError::ValidationError(MISSING_FIELDS_MESSAGE.to_string())
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        AppError::DispatchError(err.to_string())
    }
}

#[derive(Debug, Display, Clone, PartialEq)]
pub enum DispatchError {
    #[display("Missing API key")]
    MissingApiKey,

    #[display("{_0}")]
    Transport(String),

    #[display("{_0}")]
    Rejected(String),

    #[display("Unexpected provider response: {_0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Transport(err.to_string())
    }
}

/// Failures of the spreadsheet log. These are logged and never reach the client.
#[derive(Debug, Display)]
pub enum RecorderError {
    #[display("Invalid service account credentials: {_0}")]
    InvalidCredentials(String),

    #[display("Spreadsheet authentication failed: {_0}")]
    Authentication(String),

    #[display("Spreadsheet request failed: {_0}")]
    Request(String),

    #[display("Unexpected spreadsheet response: {_0}")]
    InvalidResponse(String),

    #[display("Spreadsheet has no sheets")]
    NoSheets,
}

impl From<reqwest::Error> for RecorderError {
    fn from(err: reqwest::Error) -> Self {
        RecorderError::Request(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for RecorderError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        RecorderError::InvalidCredentials(err.to_string())
    }
}
