//! Script-facing API. Every host object a script can reach is installed
//! here as a global table whose functions route through `EngineContext`,
//! so recording into the active environment happens on every call.

mod appearance;
mod environments;
mod events;
mod keybinds;
mod models;
mod store;
mod values;
mod wheel;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use mlua::Lua;

use crate::context::EngineContext;

pub(crate) use values::call_handler;
pub(crate) use wheel::{install_menu, refresh_menu};

pub(crate) fn install_api(lua: &Lua, context: Rc<RefCell<EngineContext>>) -> Result<()> {
    environments::install_environment_functions(lua, context.clone())
        .context("installing environment functions")?;
    models::install_models(lua, context.clone()).context("installing models")?;
    events::install_events(lua, context.clone()).context("installing events")?;
    events::install_pings(lua, context.clone()).context("installing pings")?;
    keybinds::install_keybinds(lua, context.clone()).context("installing keybinds")?;
    appearance::install_nameplate(lua, context.clone()).context("installing nameplate")?;
    appearance::install_renderer(lua, context.clone()).context("installing renderer")?;
    appearance::install_vanilla_model(lua, context.clone())
        .context("installing vanilla_model")?;
    wheel::install_action_wheel(lua, context.clone()).context("installing action_wheel")?;
    store::install_store(lua, context).context("installing store")?;
    Ok(())
}
