use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Lua, Result as LuaResult, Table, Value, Variadic};

use super::values::{handler_from_value, split_self, value_to_string};
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::host::{Handler, PageId};
use crate::switch;

pub(super) fn install_action_wheel(
    lua: &Lua,
    context: Rc<RefCell<EngineContext>>,
) -> LuaResult<()> {
    let wheel = lua.create_table()?;

    let page_context = context.clone();
    wheel.set(
        "newPage",
        lua.create_function(move |lua_ctx, args: Variadic<Value>| {
            let (_, values) = split_self(args);
            let title = values.first().and_then(value_to_string).unwrap_or_default();
            let id = page_context.borrow_mut().host.new_page(&title);
            page_table(lua_ctx, page_context.clone(), id)
        })?,
    )?;

    let set_context = context.clone();
    wheel.set(
        "setPage",
        lua.create_function(move |_, args: Variadic<Value>| {
            let mut args = args.into_iter();
            // `action_wheel:setPage(page)` passes the wheel itself first.
            let mut target = args.next().unwrap_or(Value::Nil);
            if let Value::Table(table) = &target {
                if table.get::<_, Option<PageId>>("page_id")?.is_none() {
                    target = args.next().unwrap_or(Value::Nil);
                }
            }
            let page = match target {
                Value::Nil => None,
                Value::Table(table) => Some(table.get::<_, PageId>("page_id")?),
                other => {
                    return Err(EngineError::argument(
                        "action_wheel:setPage",
                        format!("expected a page, got {}", other.type_name()),
                    )
                    .into())
                }
            };
            set_context.borrow_mut().set_current_page(page);
            Ok(())
        })?,
    )?;

    wheel.set(
        "getCurrentPage",
        lua.create_function(move |lua_ctx, _: Variadic<Value>| {
            let current = context.borrow().host.current_page();
            match current {
                Some(id) => Ok(Value::Table(page_table(lua_ctx, context.clone(), id)?)),
                None => Ok(Value::Nil),
            }
        })?,
    )?;

    lua.globals().set("action_wheel", wheel)?;
    Ok(())
}

fn page_table(
    lua: &Lua,
    context: Rc<RefCell<EngineContext>>,
    id: PageId,
) -> LuaResult<Table<'_>> {
    let page = lua.create_table()?;
    page.set("page_id", id)?;

    let action_context = context.clone();
    page.set(
        "newAction",
        lua.create_function(move |lua_ctx, args: Variadic<Value>| {
            let (_, values) = split_self(args);
            let mut values = values.into_iter();
            let title = values
                .next()
                .as_ref()
                .and_then(value_to_string)
                .unwrap_or_default();
            let handler = match values.next() {
                None | Some(Value::Nil) => None,
                Some(value) => Some(handler_from_value(lua_ctx, "page:newAction", value)?),
            };
            let index = action_context
                .borrow_mut()
                .host
                .add_action(id, &title, handler);
            Ok(index.map(|index| index + 1))
        })?,
    )?;

    page.set(
        "getTitle",
        lua.create_function(move |_, _: Variadic<Value>| {
            Ok(context.borrow().host.page(id).map(|page| page.title.clone()))
        })?,
    )?;

    Ok(page)
}

/// Creates the root-owned environment menu and shows it. Called once at
/// boot while root is active, so the page pointer lands in root's snapshot.
pub(crate) fn install_menu(lua: &Lua, context: &Rc<RefCell<EngineContext>>) -> LuaResult<()> {
    {
        let mut ctx = context.borrow_mut();
        let title = ctx.menu_title.clone();
        let page = ctx.host.new_page(&title);
        ctx.menu_page = Some(page);
        ctx.set_current_page(Some(page));
    }
    refresh_menu(lua, context)
}

/// Rebuilds the menu's actions from the current registry listing.
pub(crate) fn refresh_menu(lua: &Lua, context: &Rc<RefCell<EngineContext>>) -> LuaResult<()> {
    let (page, ids) = {
        let ctx = context.borrow();
        let Some(page) = ctx.menu_page else {
            return Ok(());
        };
        (page, ctx.registry.list().to_vec())
    };

    let mut actions = Vec::with_capacity(ids.len());
    for id in ids {
        let switch_context = context.clone();
        let target = id.clone();
        let func = lua.create_function(move |lua_ctx, _: Variadic<Value>| {
            Ok(switch::switch_from_script(
                lua_ctx,
                &switch_context,
                Some(&target),
            ))
        })?;
        actions.push((id, Handler::new(lua.create_registry_value(func)?)));
    }

    let mut ctx = context.borrow_mut();
    ctx.host.clear_actions(page);
    for (title, handler) in actions {
        ctx.host.add_action(page, &title, Some(handler));
    }
    Ok(())
}
