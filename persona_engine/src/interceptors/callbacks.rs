use persona_config::Category;

use super::Interceptor;
use crate::environment::Environment;
use crate::host::{CallbackEntry, Handler, HostState};
use crate::snapshot::Snapshots;

pub(crate) fn record_callback_register(snapshots: &mut Snapshots, queue: &str, entry: CallbackEntry) {
    snapshots
        .callbacks
        .entry(queue.to_string())
        .or_default()
        .push(entry);
}

pub(crate) fn record_callback_remove(snapshots: &mut Snapshots, queue: &str, name: &str) {
    if let Some(entries) = snapshots.callbacks.get_mut(queue) {
        entries.retain(|entry| entry.name.as_deref() != Some(name));
        if entries.is_empty() {
            snapshots.callbacks.remove(queue);
        }
    }
}

pub(crate) fn record_callback_clear(snapshots: &mut Snapshots, queue: &str) {
    snapshots.callbacks.remove(queue);
}

pub(crate) fn record_ping(snapshots: &mut Snapshots, name: &str, handler: Option<Handler>) {
    match handler {
        Some(handler) => {
            snapshots.pings.insert(name.to_string(), handler);
        }
        None => {
            snapshots.pings.remove(name);
        }
    }
}

/// Callback queues are shared singletons, so unloading drains every queue on
/// the bus rather than only the ones this environment touched.
pub(crate) struct EventsInterceptor;

impl Interceptor for EventsInterceptor {
    fn category(&self) -> Category {
        Category::Events
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        let mut captured = host.take_callbacks();
        captured.retain(|_, entries| !entries.is_empty());
        log::debug!(
            "captured {} callback queue(s) for {}",
            captured.len(),
            env.id()
        );
        env.snapshots.callbacks = captured;
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        for (queue, entries) in &env.snapshots.callbacks {
            for entry in entries {
                host.register_callback(queue, entry.clone());
            }
        }
    }
}

pub(crate) struct PingsInterceptor;

impl Interceptor for PingsInterceptor {
    fn category(&self) -> Category {
        Category::Pings
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        env.snapshots.pings = host.take_pings();
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        for (name, handler) in &env.snapshots.pings {
            host.set_ping(name, Some(handler.clone()));
        }
    }
}
