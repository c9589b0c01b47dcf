use persona_config::Category;

use super::Interceptor;
use crate::environment::Environment;
use crate::host::{HostState, StoreValue};
use crate::snapshot::Snapshots;

pub(crate) fn record_store(snapshots: &mut Snapshots, key: &str, value: Option<StoreValue>) {
    match value {
        Some(value) => {
            snapshots.store.insert(key.to_string(), value);
        }
        None => {
            snapshots.store.remove(key);
        }
    }
}

/// The store is one untagged namespace, so unloading takes all of it, not
/// just the keys this environment wrote.
pub(crate) struct StoreInterceptor;

impl Interceptor for StoreInterceptor {
    fn category(&self) -> Category {
        Category::Store
    }

    fn capture(&self, host: &mut HostState, env: &mut Environment) {
        env.snapshots.store = host.take_store();
    }

    fn restore(&self, host: &mut HostState, env: &mut Environment) {
        for (key, value) in &env.snapshots.store {
            host.store_set(key, Some(value.clone()));
        }
    }
}
