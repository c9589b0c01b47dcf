//! Per-environment state containers, one per capability category.
//!
//! A snapshot only ever holds fields that were explicitly customized and not
//! since reset. Absence means "host default".

use std::collections::BTreeMap;

use crate::host::{
    CallbackEntry, Handler, KeybindId, NameplateSlot, PageId, PartKey, PartValue, RendererField,
    RendererValue, StoreValue, VanillaPart,
};
use crate::recency::RecencyMap;

/// Per-part overrides. The recency backend replays pairs in the order they
/// were last touched; the map backend replays in key order and is cheaper.
#[derive(Debug, Clone)]
pub enum FieldOverrides {
    Unordered(BTreeMap<PartKey, PartValue>),
    Recency(RecencyMap<PartKey, PartValue>),
}

impl FieldOverrides {
    pub fn new(ordered: bool) -> Self {
        if ordered {
            FieldOverrides::Recency(RecencyMap::new())
        } else {
            FieldOverrides::Unordered(BTreeMap::new())
        }
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self, FieldOverrides::Recency(_))
    }

    pub fn set(&mut self, key: PartKey, value: PartValue) {
        match self {
            FieldOverrides::Unordered(map) => {
                map.insert(key, value);
            }
            FieldOverrides::Recency(map) => {
                map.insert(key, value);
            }
        }
    }

    /// Replace the stored value without counting as a touch.
    pub fn update(&mut self, key: &PartKey, value: PartValue) {
        match self {
            FieldOverrides::Unordered(map) => {
                map.insert(key.clone(), value);
            }
            FieldOverrides::Recency(map) => match map.get_mut(key) {
                Some(slot) => *slot = value,
                None => {
                    map.insert(key.clone(), value);
                }
            },
        }
    }

    pub fn touch(&mut self, key: &PartKey) {
        if let FieldOverrides::Recency(map) = self {
            map.touch(key);
        }
    }

    pub fn remove(&mut self, key: &PartKey) -> Option<PartValue> {
        match self {
            FieldOverrides::Unordered(map) => map.remove(key),
            FieldOverrides::Recency(map) => map.remove(key),
        }
    }

    pub fn get(&self, key: &PartKey) -> Option<&PartValue> {
        match self {
            FieldOverrides::Unordered(map) => map.get(key),
            FieldOverrides::Recency(map) => map.get(key),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldOverrides::Unordered(map) => map.len(),
            FieldOverrides::Recency(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in replay order.
    pub fn entries(&self) -> Vec<(PartKey, PartValue)> {
        match self {
            FieldOverrides::Unordered(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            FieldOverrides::Recency(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToggleEntry {
    pub id: KeybindId,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Snapshots {
    /// Callback queues in name order, entries in registration order.
    pub callbacks: BTreeMap<String, Vec<CallbackEntry>>,
    pub pings: BTreeMap<String, Handler>,
    /// Controls created while this environment was active.
    pub keybinds: Vec<ToggleEntry>,
    pub parts: FieldOverrides,
    pub nameplate: BTreeMap<NameplateSlot, String>,
    pub renderer: BTreeMap<RendererField, RendererValue>,
    pub vanilla: RecencyMap<VanillaPart, bool>,
    pub page: Option<PageId>,
    pub visible: Option<bool>,
    pub store: BTreeMap<String, StoreValue>,
}

impl Snapshots {
    pub fn new(ordered_parts: bool) -> Self {
        Snapshots {
            callbacks: BTreeMap::new(),
            pings: BTreeMap::new(),
            keybinds: Vec::new(),
            parts: FieldOverrides::new(ordered_parts),
            nameplate: BTreeMap::new(),
            renderer: BTreeMap::new(),
            vanilla: RecencyMap::new(),
            page: None,
            visible: None,
            store: BTreeMap::new(),
        }
    }

    pub fn owns_keybind(&self, id: KeybindId) -> bool {
        self.keybinds.iter().any(|entry| entry.id == id)
    }

    pub fn keybind_mut(&mut self, id: KeybindId) -> Option<&mut ToggleEntry> {
        self.keybinds.iter_mut().find(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::FieldOverrides;
    use crate::host::{PartField, PartKey, PartValue};

    fn visible(flag: bool) -> PartValue {
        PartValue::Visible(flag)
    }

    #[test]
    fn recency_backend_replays_by_last_touch() {
        let mut parts = FieldOverrides::new(true);
        let a = PartKey::new("alice.arm", PartField::Visible);
        let b = PartKey::new("alice.body", PartField::Visible);
        parts.set(a.clone(), visible(false));
        parts.set(b.clone(), visible(true));
        parts.set(a.clone(), visible(true));
        let keys: Vec<_> = parts.entries().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![b, a]);
    }

    #[test]
    fn update_does_not_reorder() {
        let mut parts = FieldOverrides::new(true);
        let a = PartKey::new("alice.arm", PartField::Visible);
        let b = PartKey::new("alice.body", PartField::Visible);
        parts.set(a.clone(), visible(false));
        parts.set(b.clone(), visible(true));
        parts.update(&a, visible(true));
        let entries = parts.entries();
        assert_eq!(entries[0], (a, visible(true)));
        assert_eq!(entries[1].0, b);
    }

    #[test]
    fn unordered_backend_uses_key_order() {
        let mut parts = FieldOverrides::new(false);
        let a = PartKey::new("alice.arm", PartField::Visible);
        let b = PartKey::new("alice.body", PartField::Visible);
        parts.set(b.clone(), visible(true));
        parts.set(a.clone(), visible(false));
        parts.touch(&b);
        let keys: Vec<_> = parts.entries().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![a, b]);
        assert!(!parts.is_ordered());
    }
}
