//! Capability interceptors: one per category of host state.
//!
//! Recording happens through `EngineContext::intercept`, which runs the real
//! host setter and then hands the active environment's snapshots to one of
//! the `record_*` functions below. Capture and restore are driven by the
//! switch controller through the [`Interceptor`] trait.

mod appearance;
mod callbacks;
mod keybinds;
mod parts;
mod store;
mod wheel;

use persona_config::{Capabilities, Category};

use crate::environment::Environment;
use crate::host::HostState;

pub(crate) use appearance::{
    record_nameplate, record_renderer, record_vanilla, NameplateInterceptor, RendererInterceptor,
    VanillaInterceptor,
};
pub(crate) use callbacks::{
    record_callback_clear, record_callback_register, record_callback_remove, record_ping,
    EventsInterceptor, PingsInterceptor,
};
pub(crate) use keybinds::{
    owner_prefixed, record_keybind_created, record_keybind_enabled, KeybindsInterceptor,
};
pub(crate) use parts::{record_part_field, ModelsInterceptor, VisibilityInterceptor};
pub(crate) use store::{record_store, StoreInterceptor};
pub(crate) use wheel::{record_page, ActionWheelInterceptor};

pub(crate) trait Interceptor {
    fn category(&self) -> Category;

    /// Read host truth into `env`'s snapshot, then reset the host to its
    /// baseline. Only called for the environment being unloaded.
    fn capture(&self, host: &mut HostState, env: &mut Environment);

    /// Replay `env`'s snapshot through the real host setters.
    fn restore(&self, host: &mut HostState, env: &mut Environment);
}

fn interceptor_for(category: Category) -> Box<dyn Interceptor> {
    match category {
        Category::Events => Box::new(EventsInterceptor),
        Category::Pings => Box::new(PingsInterceptor),
        Category::Keybinds => Box::new(KeybindsInterceptor),
        Category::Models => Box::new(ModelsInterceptor),
        Category::Nameplate => Box::new(NameplateInterceptor),
        Category::Renderer => Box::new(RendererInterceptor),
        Category::VanillaModel => Box::new(VanillaInterceptor),
        Category::ActionWheel => Box::new(ActionWheelInterceptor),
        Category::Visibility => Box::new(VisibilityInterceptor),
        Category::Store => Box::new(StoreInterceptor),
    }
}

/// Interceptors for every enabled category, in a fixed order. Categories
/// are independent of each other so the order carries no meaning.
pub(crate) fn build(capabilities: &Capabilities) -> Vec<Box<dyn Interceptor>> {
    capabilities.enabled().map(interceptor_for).collect()
}

#[cfg(test)]
mod tests {
    use super::build;
    use persona_config::{Capabilities, Category};

    #[test]
    fn disabled_categories_get_no_interceptor() {
        let caps = Capabilities::all_enabled()
            .with(Category::Store, false)
            .with(Category::Renderer, false);
        let categories: Vec<_> = build(&caps).iter().map(|i| i.category()).collect();
        assert_eq!(categories.len(), Category::ALL.len() - 2);
        assert!(!categories.contains(&Category::Store));
        assert!(!categories.contains(&Category::Renderer));
        assert!(categories.contains(&Category::Models));
    }
}
