use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Lua, Result as LuaResult, Table, Value, Variadic};

use super::values::{handler_from_value, split_self, value_to_bool, value_to_string};
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::host::KeybindId;

pub(super) fn install_keybinds(lua: &Lua, context: Rc<RefCell<EngineContext>>) -> LuaResult<()> {
    let keybinds = lua.create_table()?;

    let create_context = context.clone();
    keybinds.set(
        "newKeybind",
        lua.create_function(move |lua_ctx, args: Variadic<Value>| {
            let (_, values) = split_self(args);
            let name = values
                .first()
                .and_then(value_to_string)
                .ok_or_else(|| EngineError::argument("keybinds:newKeybind", "missing name"))?;
            let key = values
                .get(1)
                .and_then(value_to_string)
                .ok_or_else(|| EngineError::argument("keybinds:newKeybind", "missing key"))?;
            let enabled = match values.get(2) {
                None | Some(Value::Nil) => true,
                Some(value) => value_to_bool(value),
            };
            let id = create_context
                .borrow_mut()
                .create_keybind(&name, &key, enabled);
            keybind_table(lua_ctx, create_context.clone(), id)
        })?,
    )?;

    let lookup_context = context.clone();
    keybinds.set(
        "fromName",
        lua.create_function(move |lua_ctx, args: Variadic<Value>| {
            let (_, values) = split_self(args);
            let Some(name) = values.first().and_then(value_to_string) else {
                return Ok(Value::Nil);
            };
            let found = lookup_context.borrow().host.keybind_by_name(&name);
            match found {
                Some(id) => Ok(Value::Table(keybind_table(
                    lua_ctx,
                    lookup_context.clone(),
                    id,
                )?)),
                None => Ok(Value::Nil),
            }
        })?,
    )?;

    lua.globals().set("keybinds", keybinds)?;
    Ok(())
}

fn keybind_table(
    lua: &Lua,
    context: Rc<RefCell<EngineContext>>,
    id: KeybindId,
) -> LuaResult<Table<'_>> {
    let table = lua.create_table()?;
    table.set("id", id)?;

    let enable_context = context.clone();
    table.set(
        "setEnabled",
        lua.create_function(move |_, args: Variadic<Value>| {
            let (this, values) = split_self(args);
            let enabled = values.first().map(value_to_bool).unwrap_or(false);
            enable_context.borrow_mut().set_keybind_enabled(id, enabled);
            Ok(this)
        })?,
    )?;

    let query_context = context.clone();
    table.set(
        "isEnabled",
        lua.create_function(move |_, _: Variadic<Value>| {
            Ok(query_context
                .borrow()
                .host
                .keybind_enabled(id)
                .unwrap_or(false))
        })?,
    )?;

    let name_context = context.clone();
    table.set(
        "getName",
        lua.create_function(move |_, _: Variadic<Value>| {
            Ok(name_context
                .borrow()
                .host
                .keybind(id)
                .map(|bind| bind.name.clone()))
        })?,
    )?;

    let key_context = context.clone();
    table.set(
        "getKey",
        lua.create_function(move |_, _: Variadic<Value>| {
            Ok(key_context
                .borrow()
                .host
                .keybind(id)
                .map(|bind| bind.key.clone()))
        })?,
    )?;

    // Press handlers follow the bind, not the environment; only the enabled
    // flag takes part in isolation.
    table.set(
        "setOnPress",
        lua.create_function(move |lua_ctx, args: Variadic<Value>| {
            let (this, values) = split_self(args);
            let handler = match values.into_iter().next() {
                None | Some(Value::Nil) => None,
                Some(value) => Some(handler_from_value(lua_ctx, "keybind:setOnPress", value)?),
            };
            context.borrow_mut().host.set_keybind_press(id, handler);
            Ok(this)
        })?,
    )?;

    Ok(table)
}
