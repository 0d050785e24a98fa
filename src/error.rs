use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Link,
    Event,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Link => write!(f, "link"),
            ResourceType::Event => write!(f, "event"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubErrorCode {
    Io,
    Encode,
    Decode,
    Validation,
    InvalidConfig,
    Unavailable,
    LinkNotFound,
    EventNotFound,
    PermissionDenied,
}

impl HubErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            HubErrorCode::Io => "io",
            HubErrorCode::Encode => "encode",
            HubErrorCode::Decode => "decode",
            HubErrorCode::Validation => "validation",
            HubErrorCode::InvalidConfig => "invalid_config",
            HubErrorCode::Unavailable => "unavailable",
            HubErrorCode::LinkNotFound => "link_not_found",
            HubErrorCode::EventNotFound => "event_not_found",
            HubErrorCode::PermissionDenied => "permission_denied",
        }
    }
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
    #[error("resource unavailable: {message}")]
    Unavailable { message: String },
    #[error("{resource_type} {id} not found")]
    NotFound { resource_type: ResourceType, id: u64 },
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl HubError {
    pub fn code(&self) -> HubErrorCode {
        match self {
            HubError::Io(_) => HubErrorCode::Io,
            HubError::Encode(_) => HubErrorCode::Encode,
            HubError::Decode(_) => HubErrorCode::Decode,
            HubError::Validation(_) => HubErrorCode::Validation,
            HubError::InvalidConfig { .. } => HubErrorCode::InvalidConfig,
            HubError::Unavailable { .. } => HubErrorCode::Unavailable,
            HubError::NotFound { resource_type, .. } => match resource_type {
                ResourceType::Link => HubErrorCode::LinkNotFound,
                ResourceType::Event => HubErrorCode::EventNotFound,
            },
            HubError::PermissionDenied(_) => HubErrorCode::PermissionDenied,
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code().as_str()
    }
}
