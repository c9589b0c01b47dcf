use std::rc::Rc;

use persona_config::{Capabilities, Category, PathMode, PersonaConfig};

use crate::host::{
    CallbackEntry, Handler, HostState, KeybindId, NameplateSlot, PageId, PartKey, PartValue,
    RendererField, RendererValue, StoreValue, VanillaPart,
};
use crate::interceptors::{self, Interceptor};
use crate::registry::EnvironmentRegistry;
use crate::resources::ResourceReader;
use crate::snapshot::Snapshots;

/// Everything the Lua bindings and the switch controller share. Lives behind
/// one `Rc<RefCell<_>>`; no borrow of it is ever held across a call into Lua.
pub(crate) struct EngineContext {
    pub(crate) host: HostState,
    pub(crate) registry: EnvironmentRegistry,
    pub(crate) capabilities: Capabilities,
    pub(crate) interceptors: Vec<Box<dyn Interceptor>>,
    pub(crate) global_dirs: Vec<String>,
    pub(crate) path_mode: PathMode,
    pub(crate) resources: Rc<dyn ResourceReader>,
    pub(crate) menu_title: String,
    pub(crate) menu_page: Option<PageId>,
}

impl EngineContext {
    pub(crate) fn new(config: &PersonaConfig, resources: Rc<dyn ResourceReader>) -> Self {
        EngineContext {
            host: HostState::new(),
            registry: EnvironmentRegistry::new(config.ordered_model_replay),
            capabilities: config.capabilities.clone(),
            interceptors: interceptors::build(&config.capabilities),
            global_dirs: config.script_dirs.clone(),
            path_mode: config.path_mode,
            resources,
            menu_title: config.menu_title().to_string(),
            menu_page: None,
        }
    }

    pub(crate) fn is_enabled(&self, category: Category) -> bool {
        self.capabilities.is_enabled(category)
    }

    pub(crate) fn active_id(&self) -> String {
        self.registry.active_id().to_string()
    }

    /// Runs the real host operation, then records into the active
    /// environment's snapshots when `category` takes part in isolation.
    /// The host result is returned unchanged.
    fn intercept<R>(
        &mut self,
        category: Category,
        real: impl FnOnce(&mut HostState) -> R,
        record: impl FnOnce(&mut Snapshots, &R),
    ) -> R {
        let result = real(&mut self.host);
        if self.capabilities.is_enabled(category) {
            if let Some(env) = self.registry.active_mut() {
                record(&mut env.snapshots, &result);
            }
        }
        result
    }

    pub(crate) fn set_part_field(&mut self, key: &PartKey, value: Option<PartValue>) {
        let recorded = value.clone();
        self.intercept(
            Category::Models,
            |host| host.set_part_field(key, value),
            |snapshots, _| interceptors::record_part_field(snapshots, key, recorded),
        )
    }

    pub(crate) fn register_callback(&mut self, queue: &str, entry: CallbackEntry) {
        let recorded = entry.clone();
        self.intercept(
            Category::Events,
            |host| host.register_callback(queue, entry),
            |snapshots, _| interceptors::record_callback_register(snapshots, queue, recorded),
        )
    }

    pub(crate) fn remove_callbacks(&mut self, queue: &str, name: &str) -> usize {
        self.intercept(
            Category::Events,
            |host| host.remove_callbacks(queue, name),
            |snapshots, _| interceptors::record_callback_remove(snapshots, queue, name),
        )
    }

    pub(crate) fn clear_callbacks(&mut self, queue: &str) {
        self.intercept(
            Category::Events,
            |host| host.clear_callbacks(queue),
            |snapshots, _| interceptors::record_callback_clear(snapshots, queue),
        )
    }

    pub(crate) fn set_ping(&mut self, name: &str, handler: Option<Handler>) {
        let recorded = handler.clone();
        self.intercept(
            Category::Pings,
            |host| host.set_ping(name, handler),
            |snapshots, _| interceptors::record_ping(snapshots, name, recorded),
        )
    }

    /// New controls are owned by the active environment for good and carry
    /// its id in their display name.
    pub(crate) fn create_keybind(&mut self, name: &str, key: &str, enabled: bool) -> KeybindId {
        let display = if self.is_enabled(Category::Keybinds) {
            interceptors::owner_prefixed(self.registry.active_id(), name)
        } else {
            name.to_string()
        };
        self.intercept(
            Category::Keybinds,
            |host| host.create_keybind(&display, key, enabled),
            |snapshots, id| interceptors::record_keybind_created(snapshots, *id, enabled),
        )
    }

    pub(crate) fn set_keybind_enabled(&mut self, id: KeybindId, enabled: bool) -> bool {
        let active = self.active_id();
        self.intercept(
            Category::Keybinds,
            |host| host.set_keybind_enabled(id, enabled),
            |snapshots, exists| {
                if *exists && !interceptors::record_keybind_enabled(snapshots, id, enabled) {
                    log::debug!("keybind #{id} is not owned by {active}; change not recorded");
                }
            },
        )
    }

    pub(crate) fn set_nameplate_text(&mut self, slot: NameplateSlot, text: Option<String>) {
        let recorded = text.clone();
        self.intercept(
            Category::Nameplate,
            |host| host.set_nameplate_text(slot, text),
            |snapshots, _| interceptors::record_nameplate(snapshots, slot, recorded),
        )
    }

    pub(crate) fn set_renderer(&mut self, field: RendererField, value: Option<RendererValue>) {
        let recorded = value.clone();
        self.intercept(
            Category::Renderer,
            |host| host.set_renderer(field, value),
            |snapshots, _| interceptors::record_renderer(snapshots, field, recorded),
        )
    }

    pub(crate) fn set_vanilla_visible(&mut self, part: VanillaPart, visible: Option<bool>) {
        self.intercept(
            Category::VanillaModel,
            |host| host.set_vanilla_visible(part, visible),
            |snapshots, _| interceptors::record_vanilla(snapshots, part, visible),
        )
    }

    pub(crate) fn set_current_page(&mut self, page: Option<PageId>) {
        self.intercept(
            Category::ActionWheel,
            |host| host.set_current_page(page),
            |snapshots, _| interceptors::record_page(snapshots, page),
        )
    }

    pub(crate) fn store_set(&mut self, key: &str, value: Option<StoreValue>) {
        let recorded = value.clone();
        self.intercept(
            Category::Store,
            |host| host.store_set(key, value),
            |snapshots, _| interceptors::record_store(snapshots, key, recorded),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::EngineContext;
    use crate::host::{PartField, PartKey, PartValue, StoreValue};
    use crate::resources::MemoryResources;
    use persona_config::{Capabilities, Category, EnvironmentDescriptor, PersonaConfig};
    use std::rc::Rc;

    fn context(capabilities: Capabilities) -> EngineContext {
        let config = PersonaConfig {
            capabilities,
            ..PersonaConfig::default()
        };
        let mut ctx = EngineContext::new(&config, Rc::new(MemoryResources::new()));
        ctx.registry
            .register(&EnvironmentDescriptor::new("alice"))
            .expect("register alice");
        ctx.registry.set_active("alice").expect("activate alice");
        ctx
    }

    #[test]
    fn setter_records_into_active_snapshot_and_clears_on_empty() {
        let mut ctx = context(Capabilities::all_enabled());
        let key = PartKey::new("alice.head", PartField::Opacity);
        ctx.set_part_field(&key, Some(PartValue::Opacity(0.5)));
        assert_eq!(ctx.host.part_field(&key), Some(&PartValue::Opacity(0.5)));
        let alice = ctx.registry.lookup("alice").expect("alice");
        assert_eq!(
            alice.snapshots().parts.get(&key),
            Some(&PartValue::Opacity(0.5))
        );

        ctx.set_part_field(&key, None);
        let alice = ctx.registry.lookup("alice").expect("alice");
        assert!(alice.snapshots().parts.is_empty());
        assert!(ctx.host.part_field(&key).is_none());
    }

    #[test]
    fn disabled_category_only_reaches_the_host() {
        let mut ctx = context(Capabilities::all_enabled().with(Category::Store, false));
        ctx.store_set("mood", Some(StoreValue::Text("calm".to_string())));
        assert_eq!(
            ctx.host.store_get("mood"),
            Some(&StoreValue::Text("calm".to_string()))
        );
        let alice = ctx.registry.lookup("alice").expect("alice");
        assert!(alice.snapshots().store.is_empty());
    }

    #[test]
    fn keybinds_are_prefixed_and_owned_by_creator() {
        let mut ctx = context(Capabilities::all_enabled());
        let id = ctx.create_keybind("wave", "key.g", true);
        assert_eq!(
            ctx.host.keybind(id).map(|bind| bind.name.as_str()),
            Some("alice/wave")
        );
        let alice = ctx.registry.lookup("alice").expect("alice");
        assert!(alice.snapshots().owns_keybind(id));
    }
}
