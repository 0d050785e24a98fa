use crate::error::HubError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use uuid::Uuid;
use zeroize::Zeroizing;

const DEFAULT_BOOKING_ADDRESS: &str = "booking@localhost";

/// A booking/contact form submission. All three fields are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingInquiry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl BookingInquiry {
    pub fn validate(&self) -> Result<(), HubError> {
        if self.name.is_empty() || self.email.is_empty() || self.message.is_empty() {
            return Err(HubError::Validation(
                "name, email and message are required".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub body: String,
}

pub fn compose_inquiry_mail(inquiry: &BookingInquiry, to: impl Into<String>) -> OutboundMail {
    OutboundMail {
        to: to.into(),
        reply_to: inquiry.email.clone(),
        subject: format!("New booking inquiry from {}", inquiry.name),
        body: format!(
            "New booking/contact message:\n\nName: {}\nEmail: {}\n\nMessage:\n{}\n",
            inquiry.name, inquiry.email, inquiry.message
        ),
    }
}

/// Outbound mail settings, read from the environment. `None` unless host,
/// user and password are all present.
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub pass: Zeroizing<String>,
    pub from: Option<String>,
    pub booking_address: String,
}

impl SmtpSettings {
    pub fn from_env() -> Option<Self> {
        let host = env::var("SMTP_HOST").ok()?;
        let user = env::var("SMTP_USER").ok()?;
        let pass = env::var("SMTP_PASS").ok()?;
        Some(Self {
            host,
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            secure: env::var("SMTP_SECURE").is_ok_and(|v| v == "true"),
            user,
            pass: Zeroizing::new(pass),
            from: env::var("SMTP_FROM").ok(),
            booking_address: env::var("BOOKING_EMAIL")
                .unwrap_or_else(|_| DEFAULT_BOOKING_ADDRESS.to_string()),
        })
    }
}

/// Delivery seam. Relaying over the wire belongs to an external
/// collaborator; the store only hands over a composed message.
pub trait MailSender: Send + Sync {
    fn send(&self, mail: &OutboundMail) -> Result<(), HubError>;
}

/// Default sender: spools each message as one file under the outbox
/// directory, written with the same temp-file/rename path as the
/// collections so a crash never leaves a half-written message.
pub struct OutboxMailer {
    outbox_dir: PathBuf,
}

impl OutboxMailer {
    pub fn new(outbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            outbox_dir: outbox_dir.into(),
        }
    }
}

impl MailSender for OutboxMailer {
    fn send(&self, mail: &OutboundMail) -> Result<(), HubError> {
        fs::create_dir_all(&self.outbox_dir)?;
        let mut tmp = NamedTempFile::new_in(&self.outbox_dir)?;
        write!(
            tmp,
            "To: {}\nReply-To: {}\nSubject: {}\n\n{}",
            mail.to, mail.reply_to, mail.subject, mail.body
        )?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        let name = format!("inquiry-{}.eml", Uuid::new_v4());
        tmp.persist(self.outbox_dir.join(name))
            .map_err(|e| HubError::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BookingInquiry, MailSender, OutboxMailer, compose_inquiry_mail};
    use crate::error::HubErrorCode;
    use tempfile::tempdir;

    fn inquiry() -> BookingInquiry {
        BookingInquiry {
            name: "Sam".into(),
            email: "sam@example.com".into(),
            message: "Are you available on the 12th?".into(),
        }
    }

    #[test]
    fn all_fields_are_required() {
        let mut incomplete = inquiry();
        incomplete.message = String::new();
        let err = incomplete.validate().expect_err("missing message");
        assert_eq!(err.code(), HubErrorCode::Validation);
    }

    #[test]
    fn composed_mail_carries_the_inquiry() {
        let mail = compose_inquiry_mail(&inquiry(), "artist@example.com");
        assert_eq!(mail.to, "artist@example.com");
        assert_eq!(mail.reply_to, "sam@example.com");
        assert_eq!(mail.subject, "New booking inquiry from Sam");
        assert!(mail.body.contains("Name: Sam"));
        assert!(mail.body.contains("Are you available on the 12th?"));
    }

    #[test]
    fn outbox_mailer_spools_one_file_per_mail() {
        let dir = tempdir().expect("temp dir");
        let mailer = OutboxMailer::new(dir.path().join("outbox"));
        let mail = compose_inquiry_mail(&inquiry(), "artist@example.com");
        mailer.send(&mail).expect("spool");
        mailer.send(&mail).expect("spool again");

        let spooled: Vec<_> = std::fs::read_dir(dir.path().join("outbox"))
            .expect("read outbox")
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(spooled.len(), 2);
        let body = std::fs::read_to_string(spooled[0].path()).expect("read mail");
        assert!(body.starts_with("To: artist@example.com"));
        assert!(body.contains("Subject: New booking inquiry from Sam"));
    }
}
