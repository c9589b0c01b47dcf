use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Function, Lua, Result as LuaResult, Table, Value, Variadic};

use super::values::{handler_from_value, split_self, value_to_string};
use crate::context::EngineContext;
use crate::host::CallbackEntry;

pub(super) fn install_events(lua: &Lua, context: Rc<RefCell<EngineContext>>) -> LuaResult<()> {
    let events = lua.create_table()?;
    let index = lua.create_function(move |lua_ctx, (this, key): (Table, Value)| {
        let Some(name) = value_to_string(&key) else {
            return Ok(Value::Nil);
        };
        let queue = queue_table(lua_ctx, context.clone(), name.to_ascii_uppercase())?;
        this.raw_set(key, queue.clone())?;
        Ok(Value::Table(queue))
    })?;
    let metatable = lua.create_table()?;
    metatable.set("__index", index)?;
    events.set_metatable(Some(metatable));
    lua.globals().set("events", events)?;
    Ok(())
}

fn queue_table(
    lua: &Lua,
    context: Rc<RefCell<EngineContext>>,
    queue: String,
) -> LuaResult<Table<'_>> {
    let table = lua.create_table()?;

    let register_context = context.clone();
    let register_queue = queue.clone();
    table.set(
        "register",
        lua.create_function(move |lua_ctx, args: Variadic<Value>| {
            let (_, values) = split_self(args);
            let mut values = values.into_iter();
            let func = values.next().unwrap_or(Value::Nil);
            let name = values.next().as_ref().and_then(value_to_string);
            let operation = format!("events.{register_queue}:register");
            let handler = handler_from_value(lua_ctx, &operation, func)?;
            register_context
                .borrow_mut()
                .register_callback(&register_queue, CallbackEntry::new(handler, name));
            Ok(())
        })?,
    )?;

    let remove_context = context.clone();
    let remove_queue = queue.clone();
    table.set(
        "remove",
        lua.create_function(move |_, args: Variadic<Value>| {
            let (_, values) = split_self(args);
            let Some(name) = values.first().and_then(value_to_string) else {
                return Ok(0);
            };
            Ok(remove_context
                .borrow_mut()
                .remove_callbacks(&remove_queue, &name))
        })?,
    )?;

    let clear_context = context.clone();
    let clear_queue = queue.clone();
    table.set(
        "clear",
        lua.create_function(move |_, _: Variadic<Value>| {
            clear_context.borrow_mut().clear_callbacks(&clear_queue);
            Ok(())
        })?,
    )?;

    table.set(
        "getRegisteredCount",
        lua.create_function(move |_, _: Variadic<Value>| {
            Ok(context.borrow().host.callbacks(&queue).len())
        })?,
    )?;

    Ok(table)
}

/// `pings.<name> = fn` registers, `pings.<name>(...)` calls the registered
/// function directly. Nothing is ever stored raw on the table.
pub(super) fn install_pings(lua: &Lua, context: Rc<RefCell<EngineContext>>) -> LuaResult<()> {
    let pings = lua.create_table()?;

    let index_context = context.clone();
    let index = lua.create_function(move |lua_ctx, (_this, key): (Table, Value)| {
        let Some(name) = value_to_string(&key) else {
            return Ok(Value::Nil);
        };
        let handler = index_context.borrow().host.ping(&name).cloned();
        match handler {
            Some(handler) => Ok(Value::Function(
                lua_ctx.registry_value::<Function>(handler.key())?,
            )),
            None => Ok(Value::Nil),
        }
    })?;

    let newindex = lua.create_function(move |lua_ctx, (_this, key, value): (Table, Value, Value)| {
        let Some(name) = value_to_string(&key) else {
            return Ok(());
        };
        let handler = match value {
            Value::Nil => None,
            other => Some(handler_from_value(lua_ctx, &format!("pings.{name}"), other)?),
        };
        context.borrow_mut().set_ping(&name, handler);
        Ok(())
    })?;

    let metatable = lua.create_table()?;
    metatable.set("__index", index)?;
    metatable.set("__newindex", newindex)?;
    pings.set_metatable(Some(metatable));
    lua.globals().set("pings", pings)?;
    Ok(())
}
