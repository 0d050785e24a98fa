pub mod codec;
pub mod config;
pub mod contact;
pub mod error;
pub mod http;
pub mod record;
pub mod repository;
pub mod session;
pub mod store;

use crate::config::{DEFAULT_ADMIN_PASSWORD, HubConfig, validate_config};
use crate::contact::{BookingInquiry, MailSender, OutboxMailer, SmtpSettings, compose_inquiry_mail};
use crate::error::HubError;
use crate::record::{Event, EventDraft, Link, LinkDraft, RecordId};
use crate::repository::{EventRepository, LinkRepository};
use crate::session::{CallerContext, SessionGate};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

const OUTBOX_DIR: &str = "outbox";

/// Creates a directory with restrictive permissions (0o700 on Unix) to
/// prevent unauthorized access to the stored collections on multi-user
/// systems.
fn create_private_dir_all(path: &Path) -> Result<(), HubError> {
    #[cfg(unix)]
    {
        use std::fs::DirBuilder;
        use std::os::unix::fs::DirBuilderExt;
        use std::os::unix::fs::PermissionsExt;

        DirBuilder::new().recursive(true).mode(0o700).create(path)?;
        let metadata = fs::metadata(path)?;
        if !metadata.is_dir() {
            return Err(HubError::Validation(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }
        let mut perms = metadata.permissions();
        if perms.mode() != 0o700 {
            perms.set_mode(0o700);
            fs::set_permissions(path, perms)?;
        }
    }
    #[cfg(not(unix))]
    {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// One open hub over one data directory: the two repositories, the access
/// gate, and the booking-mail seam. All shared state lives behind this.
pub struct HubInstance {
    links: LinkRepository,
    events: EventRepository,
    gate: Arc<SessionGate>,
    mailer: Arc<dyn MailSender>,
    smtp: Option<SmtpSettings>,
}

impl HubInstance {
    pub fn open(config: HubConfig, dir: &Path) -> Result<Self, HubError> {
        validate_config(&config)?;
        info!(
            session_ttl_secs = config.session_ttl_secs,
            max_field_bytes = config.max_field_bytes,
            recovery_mode = ?config.recovery_mode,
            data_dir = %dir.display(),
            "linkhub config"
        );
        if config.admin_password.as_str() == DEFAULT_ADMIN_PASSWORD {
            warn!("admin password left at the built-in default; set ADMIN_PASSWORD");
        }
        create_private_dir_all(dir)?;
        let gate = Arc::new(SessionGate::new(&config));
        let links = LinkRepository::new(dir, &config, Arc::clone(&gate));
        let events = EventRepository::new(dir, &config, Arc::clone(&gate));
        Ok(Self {
            links,
            events,
            gate,
            mailer: Arc::new(OutboxMailer::new(dir.join(OUTBOX_DIR))),
            smtp: SmtpSettings::from_env(),
        })
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn MailSender>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn with_smtp_settings(mut self, smtp: SmtpSettings) -> Self {
        self.smtp = Some(smtp);
        self
    }

    pub fn links(&self) -> &LinkRepository {
        &self.links
    }

    pub fn events(&self) -> &EventRepository {
        &self.events
    }

    pub async fn list_links(&self) -> Result<Vec<Link>, HubError> {
        self.links.list().await
    }

    pub async fn create_link(
        &self,
        caller: &CallerContext,
        draft: LinkDraft,
    ) -> Result<Link, HubError> {
        self.links.create(caller, draft).await
    }

    pub async fn delete_link(&self, caller: &CallerContext, id: RecordId) -> Result<(), HubError> {
        self.links.remove(caller, id).await
    }

    pub async fn record_click(&self, id: RecordId) -> Result<Link, HubError> {
        self.links.record_click(id).await
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, HubError> {
        self.events.list().await
    }

    pub async fn create_event(
        &self,
        caller: &CallerContext,
        draft: EventDraft,
    ) -> Result<Event, HubError> {
        self.events.create(caller, draft).await
    }

    pub async fn delete_event(&self, caller: &CallerContext, id: RecordId) -> Result<(), HubError> {
        self.events.remove(caller, id).await
    }

    pub fn login(&self, password: &str) -> Result<Uuid, HubError> {
        self.gate.login(password)
    }

    pub fn logout(&self, caller: &CallerContext) -> bool {
        self.gate.logout(caller)
    }

    pub fn is_authorized(&self, caller: &CallerContext) -> bool {
        self.gate.is_authorized(caller)
    }

    pub fn session_ttl(&self) -> Duration {
        self.gate.session_ttl()
    }

    /// Validates an inquiry and hands the composed mail to the sender.
    /// Fails `Unavailable` when outbound mail is not configured, before any
    /// message is composed or spooled.
    pub fn submit_inquiry(&self, inquiry: &BookingInquiry) -> Result<(), HubError> {
        inquiry.validate()?;
        let Some(smtp) = &self.smtp else {
            return Err(HubError::Unavailable {
                message: "outbound mail not configured; set SMTP_HOST, SMTP_USER and SMTP_PASS"
                    .into(),
            });
        };
        let mail = compose_inquiry_mail(inquiry, smtp.booking_address.clone());
        self.mailer.send(&mail)
    }
}
