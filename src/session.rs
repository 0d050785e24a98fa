use crate::config::HubConfig;
use crate::error::HubError;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identity attached to an inbound request: at most one session token.
/// Unknown, expired, or absent tokens all fail the gate the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    session: Option<Uuid>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self { session: None }
    }

    pub fn with_session(token: Uuid) -> Self {
        Self {
            session: Some(token),
        }
    }

    /// Builds a context from an untrusted raw token. Anything that does not
    /// parse as a UUID is treated as anonymous rather than rejected.
    pub fn from_token(raw: &str) -> Self {
        match Uuid::parse_str(raw.trim()) {
            Ok(token) => Self::with_session(token),
            Err(_) => Self::anonymous(),
        }
    }

    fn session(&self) -> Option<Uuid> {
        self.session
    }
}

/// The configured admin password, reduced to a SHA-256 digest at
/// construction so the plaintext never outlives config loading.
struct AdminCredentials {
    password_sha256: [u8; 32],
}

impl AdminCredentials {
    fn from_password(password: &str) -> Self {
        Self {
            password_sha256: Sha256::digest(password.as_bytes()).into(),
        }
    }

    fn verify(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        candidate == self.password_sha256
    }
}

/// The access gate. A successful password login mints a bearer token with a
/// TTL deadline; mutating repository operations call [`require_admin`]
/// strictly before any file is touched.
///
/// [`require_admin`]: SessionGate::require_admin
pub struct SessionGate {
    credentials: AdminCredentials,
    session_ttl: Duration,
    sessions: Mutex<HashMap<Uuid, Instant>>,
}

impl SessionGate {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            credentials: AdminCredentials::from_password(config.admin_password.as_str()),
            session_ttl: Duration::from_secs(config.session_ttl_secs),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn login(&self, password: &str) -> Result<Uuid, HubError> {
        if !self.credentials.verify(password) {
            return Err(HubError::PermissionDenied("invalid password".into()));
        }
        let token = Uuid::new_v4();
        let deadline = Instant::now() + self.session_ttl;
        let mut sessions = self.sessions.lock();
        prune_expired(&mut sessions);
        sessions.insert(token, deadline);
        Ok(token)
    }

    /// Revokes the caller's session. Returns whether a live session was
    /// actually removed; logging out an anonymous caller is a no-op.
    pub fn logout(&self, caller: &CallerContext) -> bool {
        let Some(token) = caller.session() else {
            return false;
        };
        self.sessions.lock().remove(&token).is_some()
    }

    pub fn is_authorized(&self, caller: &CallerContext) -> bool {
        let Some(token) = caller.session() else {
            return false;
        };
        let mut sessions = self.sessions.lock();
        match sessions.get(&token) {
            Some(deadline) if *deadline > Instant::now() => true,
            Some(_) => {
                sessions.remove(&token);
                false
            }
            None => false,
        }
    }

    pub fn require_admin(&self, caller: &CallerContext) -> Result<(), HubError> {
        if self.is_authorized(caller) {
            Ok(())
        } else {
            Err(HubError::PermissionDenied("admin session required".into()))
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

fn prune_expired(sessions: &mut HashMap<Uuid, Instant>) {
    let now = Instant::now();
    sessions.retain(|_, deadline| *deadline > now);
}
