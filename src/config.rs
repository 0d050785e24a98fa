use crate::error::HubError;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Password the store falls back to when none is configured. `open` logs a
/// warning when it is still in use.
pub const DEFAULT_ADMIN_PASSWORD: &str = "changeme";

/// How the store reacts to a collection file that cannot be decoded after
/// the predecessor-copy fallback has also failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMode {
    /// Surface the decode error to the caller.
    Strict,
    /// Treat the collection as empty and log loudly.
    Permissive,
}

/// Runtime configuration for a hub instance.
#[derive(Clone)]
pub struct HubConfig {
    /// Admin password checked at login. Held in zeroizing memory so the
    /// secret is wiped when the last reference is dropped.
    pub admin_password: Arc<Zeroizing<String>>,
    pub session_ttl_secs: u64,
    /// Upper bound on any single text field accepted by the repositories.
    pub max_field_bytes: usize,
    pub recovery_mode: RecoveryMode,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            admin_password: Arc::new(Zeroizing::new(DEFAULT_ADMIN_PASSWORD.to_string())),
            session_ttl_secs: 2 * 60 * 60,
            max_field_bytes: 16 * 1024,
            recovery_mode: RecoveryMode::Permissive,
        }
    }
}

impl fmt::Debug for HubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubConfig")
            .field("admin_password", &"<redacted>")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("max_field_bytes", &self.max_field_bytes)
            .field("recovery_mode", &self.recovery_mode)
            .finish()
    }
}

pub fn validate_config(config: &HubConfig) -> Result<(), HubError> {
    if config.admin_password.is_empty() {
        return Err(HubError::InvalidConfig {
            message: "admin_password must not be empty".into(),
        });
    }
    if config.session_ttl_secs == 0 {
        return Err(HubError::InvalidConfig {
            message: "session_ttl_secs must be positive".into(),
        });
    }
    if config.max_field_bytes == 0 {
        return Err(HubError::InvalidConfig {
            message: "max_field_bytes must be positive".into(),
        });
    }
    Ok(())
}
