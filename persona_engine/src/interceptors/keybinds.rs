use persona_config::{Category, ROOT_ID};

use super::Interceptor;
use crate::environment::Environment;
use crate::host::{HostState, KeybindId};
use crate::snapshot::{Snapshots, ToggleEntry};

/// Display name for a control created under `owner`. Keybinds share one
/// global listing, so non-root owners tag their controls.
pub(crate) fn owner_prefixed(owner: &str, name: &str) -> String {
    if owner == ROOT_ID {
        name.to_string()
    } else {
        format!("{owner}/{name}")
    }
}

pub(crate) fn record_keybind_created(snapshots: &mut Snapshots, id: KeybindId, enabled: bool) {
    snapshots.keybinds.push(ToggleEntry { id, enabled });
}

/// Only controls owned by the recording environment are tracked.
pub(crate) fn record_keybind_enabled(snapshots: &mut Snapshots, id: KeybindId, enabled: bool) -> bool {
    match snapshots.keybind_mut(id) {
        Some(entry) => {
            entry.enabled = enabled;
            true
        }
        None => false,
    }
}

pub(crate) struct KeybindsInterceptor;

impl Interceptor for KeybindsInterceptor {
    fn category(&self) -> Category {
        Category::Keybinds
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        for entry in env.snapshots.keybinds.iter_mut() {
            if let Some(enabled) = host.keybind_enabled(entry.id) {
                entry.enabled = enabled;
                host.set_keybind_enabled(entry.id, false);
            }
        }
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        for entry in &env.snapshots.keybinds {
            host.set_keybind_enabled(entry.id, entry.enabled);
        }
    }
}
