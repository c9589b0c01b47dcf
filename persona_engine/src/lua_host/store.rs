use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Lua, Result as LuaResult, Value, Variadic};

use super::values::{split_self, store_to_value, value_to_store, value_to_string};
use crate::context::EngineContext;
use crate::error::EngineError;

pub(super) fn install_store(lua: &Lua, context: Rc<RefCell<EngineContext>>) -> LuaResult<()> {
    let store = lua.create_table()?;

    let set_context = context.clone();
    store.set(
        "set",
        lua.create_function(move |_, args: Variadic<Value>| {
            let (_, values) = split_self(args);
            let key = values
                .first()
                .and_then(value_to_string)
                .ok_or_else(|| EngineError::argument("store:set", "missing key"))?;
            let value = value_to_store("store:set", values.get(1).unwrap_or(&Value::Nil))?;
            set_context.borrow_mut().store_set(&key, value);
            Ok(())
        })?,
    )?;

    let get_context = context.clone();
    store.set(
        "get",
        lua.create_function(move |lua_ctx, args: Variadic<Value>| {
            let (_, values) = split_self(args);
            let Some(key) = values.first().and_then(value_to_string) else {
                return Ok(Value::Nil);
            };
            let value = get_context.borrow().host.store_get(&key).cloned();
            match value {
                Some(value) => store_to_value(lua_ctx, &value),
                None => Ok(Value::Nil),
            }
        })?,
    )?;

    store.set(
        "keys",
        lua.create_function(move |lua_ctx, _: Variadic<Value>| {
            let keys = context.borrow().host.store_keys();
            lua_ctx.create_sequence_from(keys)
        })?,
    )?;

    lua.globals().set("store", store)?;
    Ok(())
}
