use crate::config::HubConfig;
use crate::error::HubError;
use crate::record::{Event, EventDraft, Link, LinkDraft, RecordId};
use crate::session::{CallerContext, SessionGate};
use crate::store::CollectionStore;
use std::path::Path;
use std::sync::Arc;

pub const LINKS_FILE: &str = "links.json";
pub const EVENTS_FILE: &str = "events.json";

/// Link collection with its validator and the gate check on mutations.
/// Click recording is deliberately ungated: visitors produce clicks.
pub struct LinkRepository {
    store: CollectionStore<Link>,
    gate: Arc<SessionGate>,
    max_field_bytes: usize,
}

impl LinkRepository {
    pub fn new(dir: &Path, config: &HubConfig, gate: Arc<SessionGate>) -> Self {
        Self {
            store: CollectionStore::new(dir, LINKS_FILE, config.recovery_mode),
            gate,
            max_field_bytes: config.max_field_bytes,
        }
    }

    pub async fn list(&self) -> Result<Vec<Link>, HubError> {
        self.store.list().await
    }

    pub async fn get(&self, id: RecordId) -> Result<Link, HubError> {
        self.store.get(id).await
    }

    pub async fn create(
        &self,
        caller: &CallerContext,
        draft: LinkDraft,
    ) -> Result<Link, HubError> {
        self.gate.require_admin(caller)?;
        draft.validate(self.max_field_bytes)?;
        self.store.insert(draft.into_record()).await
    }

    pub async fn remove(&self, caller: &CallerContext, id: RecordId) -> Result<(), HubError> {
        self.gate.require_admin(caller)?;
        self.store.delete(id).await
    }

    /// The only field-level mutation in the system. Saturating so a
    /// pathological counter can never wrap back below its prior value.
    pub async fn record_click(&self, id: RecordId) -> Result<Link, HubError> {
        self.store
            .mutate(id, |link| link.click_count = link.click_count.saturating_add(1))
            .await
    }
}

/// Event collection. Same shape as links, minus click analytics.
pub struct EventRepository {
    store: CollectionStore<Event>,
    gate: Arc<SessionGate>,
    max_field_bytes: usize,
}

impl EventRepository {
    pub fn new(dir: &Path, config: &HubConfig, gate: Arc<SessionGate>) -> Self {
        Self {
            store: CollectionStore::new(dir, EVENTS_FILE, config.recovery_mode),
            gate,
            max_field_bytes: config.max_field_bytes,
        }
    }

    pub async fn list(&self) -> Result<Vec<Event>, HubError> {
        self.store.list().await
    }

    pub async fn get(&self, id: RecordId) -> Result<Event, HubError> {
        self.store.get(id).await
    }

    pub async fn create(
        &self,
        caller: &CallerContext,
        draft: EventDraft,
    ) -> Result<Event, HubError> {
        self.gate.require_admin(caller)?;
        draft.validate(self.max_field_bytes)?;
        self.store.insert(draft.into_record()).await
    }

    pub async fn remove(&self, caller: &CallerContext, id: RecordId) -> Result<(), HubError> {
        self.gate.require_admin(caller)?;
        self.store.delete(id).await
    }
}
