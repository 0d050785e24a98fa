use crate::error::{HubError, ResourceType};
use serde::{Deserialize, Serialize};

pub type RecordId = u64;

pub const STATUS_UPCOMING: &str = "upcoming";
pub const STATUS_CANCELLED: &str = "cancelled";

/// One record kind stored by a [`crate::store::CollectionStore`]. Ids are
/// assigned by the store at insert time and immutable afterwards.
pub trait StoredRecord:
    Clone + Serialize + serde::de::DeserializeOwned + Send + Sync + 'static
{
    const KIND: ResourceType;

    fn record_id(&self) -> RecordId;

    /// Called exactly once by the store while inserting.
    fn assign_record_id(&mut self, id: RecordId);
}

/// One social/platform entry. Field names in the durable form are camelCase
/// for compatibility with files written by earlier deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: RecordId,
    pub platform: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub click_count: u64,
}

impl StoredRecord for Link {
    const KIND: ResourceType = ResourceType::Link;

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn assign_record_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

fn default_status() -> String {
    STATUS_UPCOMING.to_string()
}

/// One performance/appearance entry. `status` is free-form text; `upcoming`
/// and `cancelled` are the recognized values but anything is passed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub ticket_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: String,
}

impl StoredRecord for Event {
    const KIND: ResourceType = ResourceType::Event;

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn assign_record_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

fn check_field_len(name: &str, value: &str, max_field_bytes: usize) -> Result<(), HubError> {
    if value.len() > max_field_bytes {
        return Err(HubError::Validation(format!(
            "field '{name}' exceeds {max_field_bytes} bytes"
        )));
    }
    Ok(())
}

/// Caller-supplied fields for a new link, before the store assigns an id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDraft {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl LinkDraft {
    pub fn validate(&self, max_field_bytes: usize) -> Result<(), HubError> {
        if self.platform.is_empty() || self.url.is_empty() {
            return Err(HubError::Validation("platform and url are required".into()));
        }
        check_field_len("platform", &self.platform, max_field_bytes)?;
        check_field_len("url", &self.url, max_field_bytes)?;
        if let Some(icon) = &self.icon {
            check_field_len("icon", icon, max_field_bytes)?;
        }
        Ok(())
    }

    /// Fills defaults; the id placeholder is replaced by the store.
    pub fn into_record(self) -> Link {
        Link {
            id: 0,
            platform: self.platform,
            url: self.url,
            icon: self.icon.unwrap_or_default(),
            click_count: 0,
        }
    }
}

/// Caller-supplied fields for a new event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub ticket_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl EventDraft {
    pub fn validate(&self, max_field_bytes: usize) -> Result<(), HubError> {
        if self.title.is_empty() || self.date.is_empty() {
            return Err(HubError::Validation("title and date are required".into()));
        }
        check_field_len("title", &self.title, max_field_bytes)?;
        check_field_len("date", &self.date, max_field_bytes)?;
        for (name, value) in [
            ("time", &self.time),
            ("venue", &self.venue),
            ("location", &self.location),
            ("ticketUrl", &self.ticket_url),
            ("description", &self.description),
            ("status", &self.status),
        ] {
            if let Some(value) = value {
                check_field_len(name, value, max_field_bytes)?;
            }
        }
        Ok(())
    }

    pub fn into_record(self) -> Event {
        Event {
            id: 0,
            title: self.title,
            date: self.date,
            time: self.time.unwrap_or_default(),
            venue: self.venue.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            ticket_url: self.ticket_url.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_else(default_status),
        }
    }
}
