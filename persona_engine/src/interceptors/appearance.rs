use persona_config::Category;

use super::Interceptor;
use crate::environment::Environment;
use crate::host::{HostState, NameplateSlot, RendererField, RendererValue, VanillaPart};
use crate::snapshot::Snapshots;

pub(crate) fn record_nameplate(snapshots: &mut Snapshots, slot: NameplateSlot, text: Option<String>) {
    match text {
        Some(text) => {
            snapshots.nameplate.insert(slot, text);
        }
        None => {
            snapshots.nameplate.remove(&slot);
        }
    }
}

pub(crate) fn record_renderer(
    snapshots: &mut Snapshots,
    field: RendererField,
    value: Option<RendererValue>,
) {
    match value {
        Some(value) => {
            snapshots.renderer.insert(field, value);
        }
        None => {
            snapshots.renderer.remove(&field);
        }
    }
}

pub(crate) fn record_vanilla(snapshots: &mut Snapshots, part: VanillaPart, visible: Option<bool>) {
    match visible {
        Some(flag) => {
            snapshots.vanilla.insert(part, flag);
        }
        None => {
            snapshots.vanilla.remove(&part);
        }
    }
}

/// Fixed slots; capture reads every one of them from the host.
pub(crate) struct NameplateInterceptor;

impl Interceptor for NameplateInterceptor {
    fn category(&self) -> Category {
        Category::Nameplate
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        for slot in NameplateSlot::ALL {
            match host.nameplate_text(slot).map(str::to_string) {
                Some(text) => {
                    env.snapshots.nameplate.insert(slot, text);
                    host.set_nameplate_text(slot, None);
                }
                None => {
                    env.snapshots.nameplate.remove(&slot);
                }
            }
        }
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        for (slot, text) in &env.snapshots.nameplate {
            host.set_nameplate_text(*slot, Some(text.clone()));
        }
    }
}

pub(crate) struct RendererInterceptor;

impl Interceptor for RendererInterceptor {
    fn category(&self) -> Category {
        Category::Renderer
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        for field in RendererField::ALL {
            match host.renderer(field).cloned() {
                Some(value) => {
                    env.snapshots.renderer.insert(field, value);
                    host.set_renderer(field, None);
                }
                None => {
                    env.snapshots.renderer.remove(&field);
                }
            }
        }
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        for (field, value) in &env.snapshots.renderer {
            host.set_renderer(*field, Some(value.clone()));
        }
    }
}

/// Group setters overwrite their members, so the final state depends on
/// replay order; this category always uses the recency log.
pub(crate) struct VanillaInterceptor;

impl Interceptor for VanillaInterceptor {
    fn category(&self) -> Category {
        Category::VanillaModel
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        let vanilla = &mut env.snapshots.vanilla;
        let recorded = vanilla.keys();
        for part in &recorded {
            match host.vanilla_visible(*part) {
                Some(flag) => {
                    if let Some(slot) = vanilla.get_mut(part) {
                        *slot = flag;
                    }
                }
                None => {
                    vanilla.remove(part);
                }
            }
        }
        for part in recorded {
            if host.vanilla_visible(part).is_some() {
                host.set_vanilla_visible(part, None);
            }
        }
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        let vanilla = &mut env.snapshots.vanilla;
        let entries: Vec<(VanillaPart, bool)> =
            vanilla.iter().map(|(part, flag)| (*part, *flag)).collect();
        for (part, flag) in entries {
            host.set_vanilla_visible(part, Some(flag));
            vanilla.touch(&part);
        }
    }
}
