use persona_config::Category;

use super::Interceptor;
use crate::environment::Environment;
use crate::host::{HostState, PartKey, PartValue};
use crate::snapshot::Snapshots;

pub(crate) fn record_part_field(snapshots: &mut Snapshots, key: &PartKey, value: Option<PartValue>) {
    match value {
        Some(value) => snapshots.parts.set(key.clone(), value),
        None => {
            snapshots.parts.remove(key);
        }
    }
}

/// Per-part field overrides. Capture re-reads every recorded pair from the
/// host without reordering; restore replays in backend order and counts as
/// a touch, so the recency backend keeps its relative order across switches.
pub(crate) struct ModelsInterceptor;

impl Interceptor for ModelsInterceptor {
    fn category(&self) -> Category {
        Category::Models
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        let parts = &mut env.snapshots.parts;
        for (key, _) in parts.entries() {
            match host.part_field(&key).cloned() {
                Some(current) => {
                    parts.update(&key, current);
                    host.set_part_field(&key, None);
                }
                None => {
                    parts.remove(&key);
                }
            }
        }
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        let parts = &mut env.snapshots.parts;
        for (key, value) in parts.entries() {
            host.set_part_field(&key, Some(value));
            parts.touch(&key);
        }
    }
}

/// Whole-subtree visibility of the environment's model groups.
pub(crate) struct VisibilityInterceptor;

impl Interceptor for VisibilityInterceptor {
    fn category(&self) -> Category {
        Category::Visibility
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        if env.models().is_empty() {
            return;
        }
        let groups = env.models().to_vec();
        let visible = groups.iter().all(|group| host.group_visible(group));
        env.snapshots.visible = Some(visible);
        for group in &groups {
            host.set_group_visible(group, false);
        }
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        let Some(visible) = env.snapshots.visible else {
            return;
        };
        for group in env.models() {
            host.set_group_visible(group, visible);
        }
    }
}
