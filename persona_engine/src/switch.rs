use std::cell::RefCell;
use std::rc::Rc;

use mlua::Lua;
use persona_config::{Category, ROOT_ID};
use serde::Serialize;

use crate::context::EngineContext;
use crate::environment::Lifecycle;
use crate::error::EngineError;
use crate::{loader, lua_host};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SwitchOutcome {
    /// Target was already active.
    Unchanged,
    Switched { from: String, to: String },
    /// First activation; auto-run modules completed.
    Initialized { from: String, to: String },
}

impl SwitchOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, SwitchOutcome::Unchanged)
    }
}

/// Makes `target` (root when `None`) the active environment.
pub(crate) fn switch_to(
    lua: &Lua,
    context: &Rc<RefCell<EngineContext>>,
    target: Option<&str>,
) -> Result<SwitchOutcome, EngineError> {
    let target = target.unwrap_or(ROOT_ID);
    let from = {
        let mut guard = context.borrow_mut();
        let ctx = &mut *guard;
        if !ctx.registry.contains(target) {
            log::warn!("cannot switch to unknown environment {target}");
            return Err(EngineError::UnknownEnvironment(target.to_string()));
        }
        let current = ctx.active_id();
        if current == target {
            return Ok(SwitchOutcome::Unchanged);
        }
        unload(ctx, &current);
        ctx.registry.set_active(target)?;
        current
    };
    load(lua, context, from, target)
}

/// Script-facing wrapper: failures are logged and reported as `false`.
pub(crate) fn switch_from_script(
    lua: &Lua,
    context: &Rc<RefCell<EngineContext>>,
    target: Option<&str>,
) -> bool {
    match switch_to(lua, context, target) {
        Ok(_) => true,
        Err(EngineError::UnknownEnvironment(_)) => false,
        Err(err) => {
            log::error!("switchEnvironment failed: {err}");
            false
        }
    }
}

fn unload(ctx: &mut EngineContext, id: &str) {
    let EngineContext {
        host,
        registry,
        interceptors,
        ..
    } = ctx;
    let Some(env) = registry.lookup_mut(id) else {
        log::debug!("{id} is no longer registered; nothing to capture");
        return;
    };
    for interceptor in interceptors.iter() {
        log::debug!("capturing {} for {id}", interceptor.category().as_str());
        interceptor.capture(host, env);
    }
}

fn restore(ctx: &mut EngineContext, id: &str) {
    let EngineContext {
        host,
        registry,
        interceptors,
        ..
    } = ctx;
    if let Some(env) = registry.lookup_mut(id) {
        for interceptor in interceptors.iter() {
            log::debug!("restoring {} for {id}", interceptor.category().as_str());
            interceptor.restore(host, env);
        }
    }
}

fn load(
    lua: &Lua,
    context: &Rc<RefCell<EngineContext>>,
    from: String,
    target: &str,
) -> Result<SwitchOutcome, EngineError> {
    let autorun = {
        let mut guard = context.borrow_mut();
        let ctx = &mut *guard;
        let lifecycle = ctx
            .registry
            .lookup(target)
            .map(|env| env.lifecycle())
            .ok_or_else(|| EngineError::UnknownEnvironment(target.to_string()))?;
        // Initializing means a switch back from inside its own auto-run;
        // restore instead of starting the modules again.
        if lifecycle != Lifecycle::Uninitialized {
            restore(ctx, target);
            log::info!("switched {from} -> {target}");
            return Ok(SwitchOutcome::Switched {
                from,
                to: target.to_string(),
            });
        }
        if ctx.is_enabled(Category::Visibility) {
            show_models(ctx, target);
        }
        match ctx.registry.lookup_mut(target) {
            Some(env) => {
                env.lifecycle = Lifecycle::Initializing;
                env.autorun().to_vec()
            }
            None => Vec::new(),
        }
    };

    for module in &autorun {
        if let Err(err) = loader::require_in(lua, context, target, module) {
            let message = err.to_string();
            log::error!("auto-run of {module} failed in {target}: {message}");
            rollback(lua, context, target);
            return Err(EngineError::AutoRunFailed {
                id: target.to_string(),
                module: module.clone(),
                message,
            });
        }
    }

    match context.borrow_mut().registry.lookup_mut(target) {
        Some(env) => env.lifecycle = Lifecycle::Initialized,
        None => {
            log::error!("{target} was removed before its auto-run finished");
            return Err(EngineError::EnvironmentRemoved(target.to_string()));
        }
    }
    log::info!("initialized {target} (from {from})");
    Ok(SwitchOutcome::Initialized {
        from,
        to: target.to_string(),
    })
}

/// Baseline for a freshly initialized environment: its model groups start
/// out visible.
fn show_models(ctx: &mut EngineContext, id: &str) {
    let EngineContext { host, registry, .. } = ctx;
    let Some(env) = registry.lookup_mut(id) else {
        return;
    };
    if env.models().is_empty() {
        return;
    }
    for group in env.models() {
        host.set_group_visible(group, true);
    }
    env.snapshots.visible = Some(true);
}

/// Drops an environment whose auto-run failed and falls back to root.
/// Host side effects of modules that already ran are left in place; only
/// the visibility baseline granted by `show_models` is taken back.
fn rollback(lua: &Lua, context: &Rc<RefCell<EngineContext>>, failed: &str) {
    {
        let mut guard = context.borrow_mut();
        let ctx = &mut *guard;
        let hide = ctx.is_enabled(Category::Visibility);
        if let Some(env) = ctx.registry.remove(failed) {
            if hide {
                for group in env.models() {
                    ctx.host.set_group_visible(group, false);
                }
            }
        }
    }
    if let Err(err) = lua_host::refresh_menu(lua, context) {
        log::warn!("failed to rebuild environment menu: {err}");
    }
    if let Err(err) = switch_to(lua, context, None) {
        log::error!("fallback to {ROOT_ID} failed: {err}");
    }
}
