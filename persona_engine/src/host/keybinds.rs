use std::collections::BTreeMap;

use super::{Handler, HostState};

pub type KeybindId = u32;

#[derive(Debug, Clone)]
pub struct Keybind {
    pub name: String,
    pub key: String,
    pub enabled: bool,
    pub on_press: Option<Handler>,
}

/// Keybinds live in one global listing; once created they are never removed.
#[derive(Debug, Default)]
pub(super) struct KeybindHost {
    binds: BTreeMap<KeybindId, Keybind>,
    next_id: KeybindId,
}

impl KeybindHost {
    pub(super) fn iter(&self) -> impl Iterator<Item = (&KeybindId, &Keybind)> {
        self.binds.iter()
    }
}

impl HostState {
    pub fn create_keybind(&mut self, name: &str, key: &str, enabled: bool) -> KeybindId {
        self.keybinds.next_id = self.keybinds.next_id.wrapping_add(1);
        let id = self.keybinds.next_id;
        self.log(format!("keybinds.new #{id} {name} [{key}] enabled={enabled}"));
        self.keybinds.binds.insert(
            id,
            Keybind {
                name: name.to_string(),
                key: key.to_string(),
                enabled,
                on_press: None,
            },
        );
        id
    }

    pub fn set_keybind_enabled(&mut self, id: KeybindId, enabled: bool) -> bool {
        let Some(bind) = self.keybinds.binds.get_mut(&id) else {
            return false;
        };
        bind.enabled = enabled;
        self.log(format!("keybinds.#{id}.setEnabled {enabled}"));
        true
    }

    pub fn set_keybind_press(&mut self, id: KeybindId, handler: Option<Handler>) -> bool {
        let Some(bind) = self.keybinds.binds.get_mut(&id) else {
            return false;
        };
        let action = if handler.is_some() { "set" } else { "cleared" };
        bind.on_press = handler;
        self.log(format!("keybinds.#{id}.onPress {action}"));
        true
    }

    pub fn keybind(&self, id: KeybindId) -> Option<&Keybind> {
        self.keybinds.binds.get(&id)
    }

    pub fn keybind_enabled(&self, id: KeybindId) -> Option<bool> {
        self.keybinds.binds.get(&id).map(|bind| bind.enabled)
    }

    pub fn keybind_by_name(&self, name: &str) -> Option<KeybindId> {
        self.keybinds
            .binds
            .iter()
            .find_map(|(id, bind)| (bind.name == name).then_some(*id))
    }

    /// Press handlers of every enabled bind mapped to `key`.
    pub fn pressed_handlers(&self, key: &str) -> Vec<Handler> {
        self.keybinds
            .binds
            .values()
            .filter(|bind| bind.enabled && bind.key == key)
            .filter_map(|bind| bind.on_press.clone())
            .collect()
    }
}
