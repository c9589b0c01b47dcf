use std::collections::BTreeMap;

use super::{Handler, HostState};

#[derive(Debug, Clone)]
pub struct CallbackEntry {
    pub handler: Handler,
    pub name: Option<String>,
}

impl CallbackEntry {
    pub fn new(handler: Handler, name: Option<String>) -> Self {
        CallbackEntry { handler, name }
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

/// Named callback queues. The queue objects are singletons shared by every
/// script, so the bus itself has no notion of ownership.
#[derive(Debug, Default)]
pub(super) struct EventBus {
    queues: BTreeMap<String, Vec<CallbackEntry>>,
}

impl EventBus {
    pub(super) fn queues(&self) -> impl Iterator<Item = (&String, &Vec<CallbackEntry>)> {
        self.queues.iter().filter(|(_, entries)| !entries.is_empty())
    }
}

#[derive(Debug, Default)]
pub(super) struct PingTable {
    handlers: BTreeMap<String, Handler>,
}

impl PingTable {
    pub(super) fn names(&self) -> impl Iterator<Item = &String> {
        self.handlers.keys()
    }
}

impl HostState {
    pub fn register_callback(&mut self, queue: &str, entry: CallbackEntry) {
        self.log(format!("events.{queue}.register {}", entry.label()));
        self.events
            .queues
            .entry(queue.to_string())
            .or_default()
            .push(entry);
    }

    /// Drops every entry registered under `name`, returning how many went.
    pub fn remove_callbacks(&mut self, queue: &str, name: &str) -> usize {
        self.log(format!("events.{queue}.remove {name}"));
        let Some(entries) = self.events.queues.get_mut(queue) else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|entry| entry.name.as_deref() != Some(name));
        before - entries.len()
    }

    pub fn clear_callbacks(&mut self, queue: &str) {
        self.log(format!("events.{queue}.clear"));
        self.events.queues.remove(queue);
    }

    pub fn callbacks(&self, queue: &str) -> &[CallbackEntry] {
        self.events
            .queues
            .get(queue)
            .map(|entries| entries.as_slice())
            .unwrap_or(&[])
    }

    /// Clears every queue on the bus and hands back what was registered.
    pub fn take_callbacks(&mut self) -> BTreeMap<String, Vec<CallbackEntry>> {
        let taken = std::mem::take(&mut self.events.queues);
        for queue in taken.keys() {
            self.log(format!("events.{queue}.clear"));
        }
        taken
    }

    pub fn set_ping(&mut self, name: &str, handler: Option<Handler>) {
        match handler {
            Some(handler) => {
                self.log(format!("pings.{name} set"));
                self.pings.handlers.insert(name.to_string(), handler);
            }
            None => {
                self.log(format!("pings.{name} cleared"));
                self.pings.handlers.remove(name);
            }
        }
    }

    pub fn ping(&self, name: &str) -> Option<&Handler> {
        self.pings.handlers.get(name)
    }

    pub fn take_pings(&mut self) -> BTreeMap<String, Handler> {
        let taken = std::mem::take(&mut self.pings.handlers);
        for name in taken.keys() {
            self.log(format!("pings.{name} cleared"));
        }
        taken
    }
}
