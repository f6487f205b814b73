use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    entities::{
        email::{MailIdentity, OutgoingEmail},
        sheet_row::SheetRow,
        submission::ContactForm,
    },
    errors::AppError,
    repositories::{mailer::EmailDispatcher, recorder::SubmissionRecorder},
};

pub const SUCCESS_MESSAGE: &str = "Message sent successfully!";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

impl ContactResponse {
    pub fn sent() -> Self {
        ContactResponse {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Runs a contact submission through validate, dispatch and record, in
/// that order. Only the dispatch step can fail the request once
/// validation has passed.
pub struct ContactHandler<M, R>
where
    M: EmailDispatcher,
    R: SubmissionRecorder,
{
    pub mailer: M,
    pub recorder: Option<R>,
    pub identity: MailIdentity,
}

impl<M, R> ContactHandler<M, R>
where
    M: EmailDispatcher,
    R: SubmissionRecorder,
{
    pub fn new(mailer: M, recorder: Option<R>, identity: MailIdentity) -> Self {
        ContactHandler {
            mailer,
            recorder,
            identity,
        }
    }

    pub fn recorder_enabled(&self) -> bool {
        self.recorder.is_some()
    }

    /// Handles one contact form submission end to end
    pub async fn submit(&self, form: ContactForm) -> Result<ContactResponse, AppError> {
        let submission = form.validate_submission()?;
        let received_at = Utc::now();

        let email = OutgoingEmail::compose(&submission, &self.identity);
        let receipt = self.mailer.dispatch(&email).await.map_err(|e| {
            tracing::error!(error = %e, "Email dispatch failed");
            AppError::from(e)
        })?;

        tracing::info!(email_id = %receipt.id, "Contact email dispatched");

        match &self.recorder {
            Some(recorder) => {
                record_best_effort(recorder, &SheetRow::new(&submission, received_at)).await
            }
            None => tracing::info!("Spreadsheet credentials not configured, skipping sheet log"),
        }

        Ok(ContactResponse::sent())
    }
}

/// Writes the row and logs any failure. Never propagates.
pub async fn record_best_effort<R>(recorder: &R, row: &SheetRow)
where
    R: SubmissionRecorder + ?Sized,
{
    match recorder.record(row).await {
        Ok(()) => tracing::info!("Submission appended to spreadsheet"),
        Err(e) => tracing::error!(error = %e, "Failed to append submission to spreadsheet"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::email::EmailReceipt,
        errors::{DispatchError, RecorderError, MISSING_FIELDS_MESSAGE},
        repositories::{mailer::MockEmailDispatcher, recorder::MockSubmissionRecorder},
    };

    fn identity() -> MailIdentity {
        MailIdentity {
            from: "Site <onboarding@resend.dev>".into(),
            to: "owner@example.com".into(),
        }
    }

    fn ann() -> ContactForm {
        ContactForm {
            name: Some("Ann".into()),
            email: Some("ann@x.com".into()),
            message: Some("Hi".into()),
            ..ContactForm::default()
        }
    }

    fn accepted() -> Result<EmailReceipt, DispatchError> {
        Ok(EmailReceipt { id: "email_123".into() })
    }

    #[tokio::test]
    async fn missing_fields_never_reach_the_mailer() {
        let forms = [
            ContactForm { name: None, ..ann() },
            ContactForm { email: None, ..ann() },
            ContactForm { message: Some(" ".into()), ..ann() },
        ];

        for form in forms {
            let mut mailer = MockEmailDispatcher::new();
            mailer.expect_dispatch().times(0);
            let mut recorder = MockSubmissionRecorder::new();
            recorder.expect_record().times(0);

            let handler = ContactHandler::new(mailer, Some(recorder), identity());
            let result = handler.submit(form).await;

            match result {
                Err(AppError::ValidationError(msg)) => assert_eq!(msg, MISSING_FIELDS_MESSAGE),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn dispatches_with_reply_to_and_default_subject() {
        let mut mailer = MockEmailDispatcher::new();
        mailer
            .expect_dispatch()
            .withf(|email| {
                email.reply_to == "ann@x.com"
                    && email.subject == "New Contact: General Inquiry from Ann"
                    && email.to == vec!["owner@example.com".to_string()]
            })
            .times(1)
            .returning(|_| accepted());

        let handler = ContactHandler::<_, MockSubmissionRecorder>::new(mailer, None, identity());
        let response = handler.submit(ann()).await.unwrap();

        assert_eq!(response, ContactResponse::sent());
        assert_eq!(response.message, "Message sent successfully!");
    }

    #[tokio::test]
    async fn records_once_after_successful_dispatch() {
        let mut mailer = MockEmailDispatcher::new();
        mailer.expect_dispatch().times(1).returning(|_| accepted());

        let mut recorder = MockSubmissionRecorder::new();
        recorder
            .expect_record()
            .withf(|row| row.name == "Ann" && row.subject == "General Inquiry" && row.phone.is_empty())
            .times(1)
            .returning(|_| Ok(()));

        let handler = ContactHandler::new(mailer, Some(recorder), identity());
        assert!(handler.submit(ann()).await.is_ok());
    }

    #[tokio::test]
    async fn recorder_failure_does_not_fail_the_request() {
        let mut mailer = MockEmailDispatcher::new();
        mailer.expect_dispatch().times(1).returning(|_| accepted());

        let mut recorder = MockSubmissionRecorder::new();
        recorder
            .expect_record()
            .times(1)
            .returning(|_| Err(RecorderError::Request("connection refused".into())));

        let handler = ContactHandler::new(mailer, Some(recorder), identity());
        let response = handler.submit(ann()).await.unwrap();

        assert!(response.success);
    }

    #[tokio::test]
    async fn dispatch_failure_skips_recorder() {
        let mut mailer = MockEmailDispatcher::new();
        mailer
            .expect_dispatch()
            .times(1)
            .returning(|_| Err(DispatchError::Rejected("Invalid API key".into())));

        let mut recorder = MockSubmissionRecorder::new();
        recorder.expect_record().times(0);

        let handler = ContactHandler::new(mailer, Some(recorder), identity());
        let result = handler.submit(ann()).await;

        match result {
            Err(AppError::DispatchError(detail)) => assert_eq!(detail, "Invalid API key"),
            other => panic!("expected dispatch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn recorder_is_optional() {
        let mut mailer = MockEmailDispatcher::new();
        mailer.expect_dispatch().times(1).returning(|_| accepted());

        let handler = ContactHandler::<_, MockSubmissionRecorder>::new(mailer, None, identity());

        assert!(!handler.recorder_enabled());
        assert!(handler.submit(ann()).await.is_ok());
    }
}
