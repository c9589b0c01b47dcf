use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Lua, Result as LuaResult, Value, Variadic};

use super::values::{describe_value, split_self, value_to_string};
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::{loader, switch};

pub(super) fn install_environment_functions(
    lua: &Lua,
    context: Rc<RefCell<EngineContext>>,
) -> LuaResult<()> {
    let globals = lua.globals();

    let switch_context = context.clone();
    globals.set(
        "switchEnvironment",
        lua.create_function(move |lua_ctx, args: Variadic<Value>| {
            let target = args.first().and_then(value_to_string);
            Ok(switch::switch_from_script(
                lua_ctx,
                &switch_context,
                target.as_deref(),
            ))
        })?,
    )?;

    let current_context = context.clone();
    globals.set(
        "currentEnvironmentId",
        lua.create_function(move |_, _: Variadic<Value>| Ok(current_context.borrow().active_id()))?,
    )?;

    let list_context = context.clone();
    globals.set(
        "listEnvironmentIds",
        lua.create_function(move |lua_ctx, _: Variadic<Value>| {
            let ids = list_context.borrow().registry.list().to_vec();
            lua_ctx.create_sequence_from(ids)
        })?,
    )?;

    let require_context = context.clone();
    globals.set(
        "require",
        lua.create_function(move |lua_ctx, args: Variadic<Value>| {
            let (_, values) = split_self(args);
            let name = values
                .first()
                .and_then(value_to_string)
                .ok_or_else(|| EngineError::argument("require", "expected a module name"))?;
            loader::require(lua_ctx, &require_context, &name)
        })?,
    )?;

    globals.set(
        "print",
        lua.create_function(move |_, args: Variadic<Value>| {
            let line = args
                .iter()
                .map(describe_value)
                .collect::<Vec<_>>()
                .join("\t");
            log::info!("[lua:{}] {line}", context.borrow().active_id());
            Ok(())
        })?,
    )?;

    Ok(())
}
