use std::cell::{Ref, RefCell};
use std::rc::Rc;

use anyhow::{Context, Result};
use mlua::{FromLuaMulti, Lua, LuaOptions, MultiValue, StdLib};
use persona_config::{Category, ConfigError, PersonaConfig};
use serde::Serialize;

use crate::context::EngineContext;
use crate::environment::{Environment, Lifecycle};
use crate::error::EngineError;
use crate::host::{HostState, HostSummary};
use crate::loader;
use crate::lua_host::{self, call_handler};
use crate::resources::ResourceReader;
use crate::switch::{self, SwitchOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentSummary {
    pub id: String,
    pub initialized: bool,
    pub cached_modules: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineSummary {
    pub active: String,
    pub environments: Vec<EnvironmentSummary>,
    pub host: HostSummary,
}

/// A booted Lua runtime plus the environment machinery around it.
pub struct Engine {
    lua: Lua,
    context: Rc<RefCell<EngineContext>>,
}

impl Engine {
    /// Registers every usable descriptor, installs the script API and the
    /// environment menu, then activates the default environment if one was
    /// marked. An auto-run failure of the default leaves the engine on root.
    pub fn boot(config: &PersonaConfig, resources: Rc<dyn ResourceReader>) -> Result<Self> {
        let mut ctx = EngineContext::new(config, resources);

        let mut default_id: Option<String> = None;
        for descriptor in &config.environments {
            match ctx.registry.register(descriptor) {
                Ok(id) => {
                    log::debug!("registered environment {id}");
                    if descriptor.default {
                        match &default_id {
                            None => default_id = Some(id),
                            Some(first) => {
                                log::warn!("{id} is also marked default; keeping {first}")
                            }
                        }
                    }
                }
                Err(err) => log::warn!("skipping environment descriptor: {err}"),
            }
        }
        if ctx.registry.list().is_empty() {
            return Err(ConfigError::NoEnvironments.into());
        }

        if ctx.is_enabled(Category::Visibility) {
            let groups: Vec<String> = ctx
                .registry
                .iter()
                .flat_map(|env| env.models().to_vec())
                .collect();
            for group in groups {
                ctx.host.set_group_visible(&group, false);
            }
        }

        let lua = Lua::new_with(StdLib::ALL_SAFE, LuaOptions::default())
            .context("initialising Lua runtime with standard libraries")?;
        let context = Rc::new(RefCell::new(ctx));
        lua_host::install_api(&lua, context.clone())?;
        lua_host::install_menu(&lua, &context).context("building environment menu")?;

        let engine = Engine { lua, context };
        if let Some(id) = default_id {
            match engine.switch_environment(Some(&id)) {
                Ok(outcome) => log::debug!("default environment: {outcome:?}"),
                Err(err @ EngineError::AutoRunFailed { .. }) => {
                    log::error!("default environment unavailable: {err}")
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("activating default environment {id}"))
                }
            }
        }
        Ok(engine)
    }

    pub fn switch_environment(&self, id: Option<&str>) -> Result<SwitchOutcome, EngineError> {
        switch::switch_to(&self.lua, &self.context, id)
    }

    pub fn current_environment_id(&self) -> String {
        self.context.borrow().active_id()
    }

    pub fn list_environment_ids(&self) -> Vec<String> {
        self.context.borrow().registry.list().to_vec()
    }

    /// `require` against the active environment.
    pub fn require(&self, name: &str) -> mlua::Result<MultiValue<'_>> {
        loader::require(&self.lua, &self.context, name)
    }

    /// Runs an ad-hoc chunk in the active environment's namespace.
    pub fn exec(&self, source: &str) -> mlua::Result<()> {
        self.eval::<()>(source)
    }

    pub fn eval<'lua, R: FromLuaMulti<'lua>>(&'lua self, source: &str) -> mlua::Result<R> {
        let env_id = self.current_environment_id();
        let values = loader::exec_in(
            &self.lua,
            &self.context,
            &env_id,
            "=exec",
            source,
            MultiValue::new(),
        )?;
        self.lua.unpack_multi(values)
    }

    /// Calls every handler on `queue` in registration order; returns how
    /// many ran.
    pub fn fire_event(&self, queue: &str) -> mlua::Result<usize> {
        let handlers: Vec<_> = self
            .context
            .borrow()
            .host
            .callbacks(&queue.to_ascii_uppercase())
            .iter()
            .map(|entry| entry.handler.clone())
            .collect();
        for handler in &handlers {
            call_handler(&self.lua, handler, ())?;
        }
        Ok(handlers.len())
    }

    pub fn press_key(&self, key: &str) -> mlua::Result<usize> {
        let handlers = self.context.borrow().host.pressed_handlers(key);
        for handler in &handlers {
            call_handler(&self.lua, handler, ())?;
        }
        Ok(handlers.len())
    }

    /// Clicks the 1-based `index`th action on the page the host is showing.
    /// Returns false when there is no such action or it has no handler.
    pub fn click_action(&self, index: usize) -> mlua::Result<bool> {
        let handler = {
            let ctx = self.context.borrow();
            ctx.host
                .current_page()
                .and_then(|page| ctx.host.page(page))
                .and_then(|page| index.checked_sub(1).and_then(|i| page.actions.get(i)))
                .and_then(|action| action.handler.clone())
        };
        match handler {
            Some(handler) => {
                call_handler(&self.lua, &handler, ())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Points the host at the environment menu without recording the change.
    pub fn open_menu(&self) {
        let mut ctx = self.context.borrow_mut();
        let page = ctx.menu_page;
        ctx.host.set_current_page(page);
    }

    pub fn host(&self) -> Ref<'_, HostState> {
        Ref::map(self.context.borrow(), |ctx| &ctx.host)
    }

    pub fn environment(&self, id: &str) -> Option<Ref<'_, Environment>> {
        Ref::filter_map(self.context.borrow(), |ctx| ctx.registry.lookup(id)).ok()
    }

    pub fn journal(&self) -> Vec<String> {
        self.context.borrow().host.journal().to_vec()
    }

    pub fn summary(&self) -> EngineSummary {
        let ctx = self.context.borrow();
        let environments = ctx
            .registry
            .iter()
            .map(|env| EnvironmentSummary {
                id: env.id().to_string(),
                initialized: env.lifecycle() == Lifecycle::Initialized,
                cached_modules: env.modules.keys().cloned().collect(),
            })
            .collect();
        EngineSummary {
            active: ctx.active_id(),
            environments,
            host: ctx.host.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::error::EngineError;
    use crate::resources::MemoryResources;
    use persona_config::{EnvironmentDescriptor, PersonaConfig, ROOT_ID};
    use std::rc::Rc;

    fn config(environments: Vec<EnvironmentDescriptor>) -> PersonaConfig {
        PersonaConfig {
            environments,
            ..PersonaConfig::default()
        }
    }

    #[test]
    fn boot_fails_without_any_registered_environment() {
        let cfg = config(vec![
            EnvironmentDescriptor::new(ROOT_ID),
            EnvironmentDescriptor::default(),
        ]);
        let err = Engine::boot(&cfg, Rc::new(MemoryResources::new()))
            .err()
            .expect("boot must fail");
        assert!(err.to_string().contains("no environment"));
    }

    #[test]
    fn boot_activates_the_first_default_and_builds_the_menu() {
        let cfg = config(vec![
            EnvironmentDescriptor::new("alice").with_model("alice"),
            EnvironmentDescriptor::new("bob").as_default().with_model("bob"),
            EnvironmentDescriptor::new("carol").as_default(),
        ]);
        let engine = Engine::boot(&cfg, Rc::new(MemoryResources::new())).expect("boot");
        assert_eq!(engine.current_environment_id(), "bob");
        assert_eq!(engine.list_environment_ids(), ["alice", "bob", "carol"]);

        let host = engine.host();
        assert!(!host.group_visible("alice"));
        assert!(host.group_visible("bob"));
        drop(host);

        engine.open_menu();
        assert!(engine.click_action(1).expect("click"));
        assert_eq!(engine.current_environment_id(), "alice");
        assert!(!engine.click_action(9).expect("missing action"));
    }

    #[test]
    fn scripts_see_environment_functions() {
        let cfg = config(vec![EnvironmentDescriptor::new("alice")]);
        let engine = Engine::boot(&cfg, Rc::new(MemoryResources::new())).expect("boot");
        engine
            .exec(
                r#"
                assert(currentEnvironmentId() == "root")
                assert(listEnvironmentIds()[1] == "alice")
                assert(switchEnvironment("alice") == true)
                assert(switchEnvironment("ghost") == false)
                "#,
            )
            .expect("script runs");
        assert_eq!(engine.current_environment_id(), "alice");
        assert_eq!(
            engine.switch_environment(Some("ghost")),
            Err(EngineError::UnknownEnvironment("ghost".to_string()))
        );
    }
}
