use std::collections::BTreeMap;

use persona_config::{is_valid_id, EnvironmentDescriptor, ROOT_ID};

use crate::environment::Environment;
use crate::error::EngineError;

/// Owns every environment and the active-environment pointer.
#[derive(Debug)]
pub struct EnvironmentRegistry {
    active: String,
    order: Vec<String>,
    environments: BTreeMap<String, Environment>,
    ordered_parts: bool,
}

impl EnvironmentRegistry {
    pub fn new(ordered_parts: bool) -> Self {
        let mut environments = BTreeMap::new();
        environments.insert(ROOT_ID.to_string(), Environment::root(ordered_parts));
        EnvironmentRegistry {
            active: ROOT_ID.to_string(),
            order: Vec::new(),
            environments,
            ordered_parts,
        }
    }

    pub fn register(&mut self, descriptor: &EnvironmentDescriptor) -> Result<String, EngineError> {
        let id = descriptor
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(EngineError::MissingId)?;
        if id == ROOT_ID {
            return Err(EngineError::ReservedId(id.to_string()));
        }
        if !is_valid_id(id) {
            return Err(EngineError::InvalidId(id.to_string()));
        }
        if self.environments.contains_key(id) {
            return Err(EngineError::DuplicateId(id.to_string()));
        }
        let environment =
            Environment::from_descriptor(id.to_string(), descriptor, self.ordered_parts);
        self.environments.insert(id.to_string(), environment);
        self.order.push(id.to_string());
        Ok(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.environments.contains_key(id)
    }

    pub fn lookup(&self, id: &str) -> Option<&Environment> {
        self.environments.get(id)
    }

    pub fn lookup_mut(&mut self, id: &str) -> Option<&mut Environment> {
        self.environments.get_mut(id)
    }

    /// Removes a non-root environment for good. The active pointer is left
    /// alone; callers redirect it first.
    pub fn remove(&mut self, id: &str) -> Option<Environment> {
        if id == ROOT_ID {
            return None;
        }
        let removed = self.environments.remove(id)?;
        self.order.retain(|entry| entry != id);
        Some(removed)
    }

    /// Registered ids in insertion order, root excluded.
    pub fn list(&self) -> &[String] {
        &self.order
    }

    pub fn active_id(&self) -> &str {
        &self.active
    }

    pub fn active(&self) -> Option<&Environment> {
        self.environments.get(&self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut Environment> {
        self.environments.get_mut(&self.active)
    }

    pub fn set_active(&mut self, id: &str) -> Result<(), EngineError> {
        if !self.environments.contains_key(id) {
            return Err(EngineError::UnknownEnvironment(id.to_string()));
        }
        self.active = id.to_string();
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        std::iter::once(ROOT_ID)
            .chain(self.order.iter().map(|id| id.as_str()))
            .filter_map(|id| self.environments.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::EnvironmentRegistry;
    use crate::environment::Lifecycle;
    use crate::error::EngineError;
    use persona_config::{EnvironmentDescriptor, ROOT_ID};

    #[test]
    fn register_rejects_bad_descriptors_and_keeps_order() {
        let mut registry = EnvironmentRegistry::new(true);
        assert_eq!(
            registry.register(&EnvironmentDescriptor::new("bob")),
            Ok("bob".to_string())
        );
        assert_eq!(
            registry.register(&EnvironmentDescriptor::new("alice")),
            Ok("alice".to_string())
        );
        assert_eq!(
            registry.register(&EnvironmentDescriptor::new("bob")),
            Err(EngineError::DuplicateId("bob".to_string()))
        );
        assert_eq!(
            registry.register(&EnvironmentDescriptor::new(ROOT_ID)),
            Err(EngineError::ReservedId(ROOT_ID.to_string()))
        );
        assert_eq!(
            registry.register(&EnvironmentDescriptor::default()),
            Err(EngineError::MissingId)
        );
        assert_eq!(
            registry.register(&EnvironmentDescriptor::new("a b")),
            Err(EngineError::InvalidId("a b".to_string()))
        );
        assert_eq!(registry.list(), ["bob", "alice"]);
        assert_eq!(
            registry.lookup("bob").map(|env| env.lifecycle()),
            Some(Lifecycle::Uninitialized)
        );
    }

    #[test]
    fn root_is_always_present_and_never_removed() {
        let mut registry = EnvironmentRegistry::new(false);
        assert_eq!(registry.active_id(), ROOT_ID);
        assert!(registry.list().is_empty());
        assert!(registry.remove(ROOT_ID).is_none());
        let root = registry.lookup(ROOT_ID).expect("root exists");
        assert_eq!(root.lifecycle(), Lifecycle::Initialized);
        assert!(root.models().is_empty());
    }

    #[test]
    fn remove_drops_from_listing_without_moving_active() {
        let mut registry = EnvironmentRegistry::new(true);
        registry
            .register(&EnvironmentDescriptor::new("alice"))
            .expect("register");
        registry.set_active("alice").expect("activate");
        assert!(registry.remove("alice").is_some());
        assert!(registry.list().is_empty());
        assert_eq!(registry.active_id(), "alice");
        assert!(registry.active().is_none());
        assert_eq!(
            registry.set_active("ghost"),
            Err(EngineError::UnknownEnvironment("ghost".to_string()))
        );
    }
}
