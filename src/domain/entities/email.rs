use ammonia::clean_text;
use serde::{Deserialize, Serialize};

use super::submission::Submission;

const PHONE_PLACEHOLDER: &str = "Not provided";

/// Fixed sender and recipient for every relayed message.
#[derive(Debug, Clone)]
pub struct MailIdentity {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmailReceipt {
    pub id: String,
}

impl OutgoingEmail {
    pub fn compose(submission: &Submission, identity: &MailIdentity) -> Self {
        let phone = submission.phone.as_deref().unwrap_or(PHONE_PLACEHOLDER);

        let html = format!(
            "<h3>New Message from {name}</h3>\n\
             <p><strong>Email:</strong> {email}</p>\n\
             <p><strong>Phone:</strong> {phone}</p>\n\
             <p><strong>Subject:</strong> {subject}</p>\n\
             <hr />\n\
             <p><strong>Message:</strong></p>\n\
             <p>{message}</p>\n",
            name = escape(&submission.name),
            email = escape(&submission.email),
            phone = escape(phone),
            subject = escape(&submission.subject),
            message = html_paragraph(&submission.message),
        );

        let text = format!(
            "New Message from {}\n\nEmail: {}\nPhone: {}\nSubject: {}\n\nMessage:\n{}\n",
            submission.name, submission.email, phone, submission.subject, submission.message,
        );

        OutgoingEmail {
            from: identity.from.clone(),
            to: vec![identity.to.clone()],
            reply_to: submission.email.clone(),
            subject: format!("New Contact: {} from {}", submission.subject, submission.name),
            html,
            text,
        }
    }
}

/// `clean_text` per word, so plain spaces stay literal.
fn escape(text: &str) -> String {
    text.split(' ').map(clean_text).collect::<Vec<_>>().join(" ")
}

/// Escapes each line and joins them with `<br>`.
fn html_paragraph(message: &str) -> String {
    message
        .lines()
        .map(escape)
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::submission::DEFAULT_SUBJECT;

    fn identity() -> MailIdentity {
        MailIdentity {
            from: "Site <onboarding@resend.dev>".into(),
            to: "owner@example.com".into(),
        }
    }

    fn submission() -> Submission {
        Submission {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            phone: None,
            subject: DEFAULT_SUBJECT.into(),
            message: "Hi".into(),
        }
    }

    #[test]
    fn compose_sets_addressing_and_subject() {
        let email = OutgoingEmail::compose(&submission(), &identity());

        assert_eq!(email.from, "Site <onboarding@resend.dev>");
        assert_eq!(email.to, vec!["owner@example.com".to_string()]);
        assert_eq!(email.reply_to, "ann@x.com");
        assert_eq!(email.subject, "New Contact: General Inquiry from Ann");
    }

    #[test]
    fn compose_renders_placeholder_phone() {
        let email = OutgoingEmail::compose(&submission(), &identity());

        assert!(email.text.contains("Phone: Not provided"));
        assert!(email.html.contains("<p><strong>Phone:</strong> Not provided</p>"));
    }

    #[test]
    fn message_newlines_become_line_breaks() {
        let mut sub = submission();
        sub.message = "first\nsecond\r\nthird".into();

        let email = OutgoingEmail::compose(&sub, &identity());

        assert!(email.html.contains("<p>first<br>second<br>third</p>"));
        assert!(email.text.contains("first\nsecond\r\nthird"));
    }

    #[test]
    fn submitted_markup_is_escaped() {
        let mut sub = submission();
        sub.name = "<script>".into();
        sub.message = "<b>bold</b>".into();

        let email = OutgoingEmail::compose(&sub, &identity());

        assert!(email.html.contains("&lt;script&gt;"));
        assert!(!email.html.contains("<script>"));
        assert!(!email.html.contains("<b>bold"));
    }

    #[test]
    fn spaces_survive_escaping() {
        let mut sub = submission();
        sub.message = "see you at 5 & bring <notes>".into();

        let email = OutgoingEmail::compose(&sub, &identity());

        assert!(email.html.contains("<p>see you at 5 &amp; bring &lt;notes&gt;</p>"));
        assert!(email.html.contains("<h3>New Message from Ann</h3>"));
    }
}
