//! In-memory model of the avatar host's presentation state.
//!
//! Every setter here is a "real" host operation: it mutates host state and
//! appends one entry to the journal. Interception and environment
//! bookkeeping live elsewhere; nothing in this module knows about
//! environments.

mod appearance;
mod events;
mod keybinds;
mod models;
mod store;
mod wheel;

use std::collections::BTreeMap;
use std::rc::Rc;

use mlua::RegistryKey;
use serde::Serialize;

pub use appearance::{NameplateSlot, RendererField, RendererValue, VanillaPart};
pub use events::CallbackEntry;
pub use keybinds::{Keybind, KeybindId};
pub use models::{PartField, PartKey, PartValue};
pub use store::StoreValue;
pub use wheel::{Action, Page, PageId};

use appearance::{NameplateHost, RendererHost, VanillaHost};
use events::{EventBus, PingTable};
use keybinds::KeybindHost;
use models::ModelHost;
use store::StoreHost;
use wheel::ActionWheel;

/// Shared reference to a Lua function parked in the Lua registry.
#[derive(Debug, Clone)]
pub struct Handler(Rc<RegistryKey>);

impl Handler {
    pub fn new(key: RegistryKey) -> Self {
        Handler(Rc::new(key))
    }

    pub fn key(&self) -> &RegistryKey {
        &self.0
    }
}

#[derive(Debug, Default)]
pub struct HostState {
    models: ModelHost,
    events: EventBus,
    pings: PingTable,
    keybinds: KeybindHost,
    nameplate: NameplateHost,
    renderer: RendererHost,
    vanilla: VanillaHost,
    wheel: ActionWheel,
    store: StoreHost,
    journal: Vec<String>,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&mut self, entry: impl Into<String>) {
        self.journal.push(entry.into());
    }

    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    pub fn summary(&self) -> HostSummary {
        let parts = self
            .models
            .overrides()
            .map(|(key, value)| (format!("{}.{}", key.part, key.field.as_str()), value.clone()))
            .collect();
        let hidden_groups = self.models.hidden_groups().cloned().collect();
        let events = self
            .events
            .queues()
            .map(|(queue, entries)| {
                let names = entries
                    .iter()
                    .map(|entry| entry.name.clone().unwrap_or_else(|| "<anonymous>".to_string()))
                    .collect();
                (queue.clone(), names)
            })
            .collect();
        let pings = self.pings.names().cloned().collect();
        let keybinds = self
            .keybinds
            .iter()
            .map(|(id, bind)| KeybindSummary {
                id: *id,
                name: bind.name.clone(),
                key: bind.key.clone(),
                enabled: bind.enabled,
            })
            .collect();
        let nameplate = self
            .nameplate
            .iter()
            .map(|(slot, text)| (slot.as_str().to_string(), text.clone()))
            .collect();
        let renderer = self
            .renderer
            .iter()
            .map(|(field, value)| (field.as_str().to_string(), value.clone()))
            .collect();
        let vanilla_model = self
            .vanilla
            .iter()
            .map(|(part, visible)| (part.as_str().to_string(), *visible))
            .collect();
        let current_page = self
            .wheel
            .current()
            .and_then(|id| self.wheel.page(id))
            .map(|page| page.title.clone());
        HostSummary {
            parts,
            hidden_groups,
            events,
            pings,
            keybinds,
            nameplate,
            renderer,
            vanilla_model,
            current_page,
            store: self.store.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            journal_len: self.journal.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeybindSummary {
    pub id: KeybindId,
    pub name: String,
    pub key: String,
    pub enabled: bool,
}

/// Serializable view of host-visible state, handlers shown by name only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostSummary {
    pub parts: BTreeMap<String, PartValue>,
    pub hidden_groups: Vec<String>,
    pub events: BTreeMap<String, Vec<String>>,
    pub pings: Vec<String>,
    pub keybinds: Vec<KeybindSummary>,
    pub nameplate: BTreeMap<String, String>,
    pub renderer: BTreeMap<String, RendererValue>,
    pub vanilla_model: BTreeMap<String, bool>,
    pub current_page: Option<String>,
    pub store: BTreeMap<String, StoreValue>,
    pub journal_len: usize,
}
