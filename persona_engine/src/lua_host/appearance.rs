use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Lua, Result as LuaResult, Table, Value, Variadic};

use super::values::{
    split_receiver, value_to_bool, value_to_f64, value_to_string, values_to_vec3, vec3_to_table,
};
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::host::{NameplateSlot, RendererField, RendererValue, VanillaPart};

pub(super) fn install_nameplate(lua: &Lua, context: Rc<RefCell<EngineContext>>) -> LuaResult<()> {
    let nameplate = lua.create_table()?;
    for slot in NameplateSlot::ALL {
        nameplate.set(slot.as_str(), slot_table(lua, context.clone(), vec![slot])?)?;
    }
    nameplate.set(
        "ALL",
        slot_table(lua, context, NameplateSlot::ALL.to_vec())?,
    )?;
    lua.globals().set("nameplate", nameplate)?;
    Ok(())
}

fn slot_table(
    lua: &Lua,
    context: Rc<RefCell<EngineContext>>,
    slots: Vec<NameplateSlot>,
) -> LuaResult<Table<'_>> {
    let table = lua.create_table()?;
    let receiver = table.to_pointer() as usize;
    let first = slots[0];

    let set_context = context.clone();
    table.set(
        "setText",
        lua.create_function(move |_, args: Variadic<Value>| {
            let (this, values) = split_receiver(receiver, args);
            let text = values.first().and_then(value_to_string);
            let mut ctx = set_context.borrow_mut();
            for slot in &slots {
                ctx.set_nameplate_text(*slot, text.clone());
            }
            Ok(this)
        })?,
    )?;

    table.set(
        "getText",
        lua.create_function(move |_, _: Variadic<Value>| {
            Ok(context
                .borrow()
                .host
                .nameplate_text(first)
                .map(str::to_string))
        })?,
    )?;

    Ok(table)
}

fn renderer_methods(field: RendererField) -> (&'static str, &'static str) {
    match field {
        RendererField::ShadowRadius => ("setShadowRadius", "getShadowRadius"),
        RendererField::Fov => ("setFov", "getFov"),
        RendererField::RenderFire => ("setRenderFire", "getRenderFire"),
        RendererField::RenderVehicle => ("setRenderVehicle", "getRenderVehicle"),
        RendererField::CameraOffset => ("setCameraOffset", "getCameraOffset"),
    }
}

pub(super) fn install_renderer(lua: &Lua, context: Rc<RefCell<EngineContext>>) -> LuaResult<()> {
    let renderer = lua.create_table()?;
    let receiver = renderer.to_pointer() as usize;
    for field in RendererField::ALL {
        let (setter, getter) = renderer_methods(field);

        let set_context = context.clone();
        renderer.set(
            setter,
            lua.create_function(move |_, args: Variadic<Value>| {
                let (this, values) = split_receiver(receiver, args);
                let value = parse_renderer_value(field, setter, &values)?;
                set_context.borrow_mut().set_renderer(field, value);
                Ok(this)
            })?,
        )?;

        let get_context = context.clone();
        renderer.set(
            getter,
            lua.create_function(move |lua_ctx, _: Variadic<Value>| {
                let value = get_context.borrow().host.renderer(field).cloned();
                Ok(match value {
                    None => Value::Nil,
                    Some(RendererValue::ShadowRadius(n)) | Some(RendererValue::Fov(n)) => {
                        Value::Number(n)
                    }
                    Some(RendererValue::RenderFire(flag))
                    | Some(RendererValue::RenderVehicle(flag)) => Value::Boolean(flag),
                    Some(RendererValue::CameraOffset(offset)) => {
                        Value::Table(vec3_to_table(lua_ctx, offset)?)
                    }
                })
            })?,
        )?;
    }
    lua.globals().set("renderer", renderer)?;
    Ok(())
}

fn parse_renderer_value(
    field: RendererField,
    operation: &str,
    values: &[Value],
) -> Result<Option<RendererValue>, EngineError> {
    let first = match values.first() {
        None | Some(Value::Nil) => return Ok(None),
        Some(first) => first,
    };
    let number = || {
        value_to_f64(first).ok_or_else(|| EngineError::argument(operation, "expected a number"))
    };
    let value = match field {
        RendererField::ShadowRadius => RendererValue::ShadowRadius(number()?),
        RendererField::Fov => RendererValue::Fov(number()?),
        RendererField::RenderFire => RendererValue::RenderFire(value_to_bool(first)),
        RendererField::RenderVehicle => RendererValue::RenderVehicle(value_to_bool(first)),
        RendererField::CameraOffset => {
            RendererValue::CameraOffset(values_to_vec3(operation, values)?)
        }
    };
    Ok(Some(value))
}

pub(super) fn install_vanilla_model(
    lua: &Lua,
    context: Rc<RefCell<EngineContext>>,
) -> LuaResult<()> {
    let vanilla = lua.create_table()?;
    for part in VanillaPart::EVERY {
        let table = lua.create_table()?;
        let receiver = table.to_pointer() as usize;

        let set_context = context.clone();
        table.set(
            "setVisible",
            lua.create_function(move |_, args: Variadic<Value>| {
                let (this, values) = split_receiver(receiver, args);
                let visible = match values.first() {
                    None | Some(Value::Nil) => None,
                    Some(value) => Some(value_to_bool(value)),
                };
                set_context.borrow_mut().set_vanilla_visible(part, visible);
                Ok(this)
            })?,
        )?;

        let get_context = context.clone();
        table.set(
            "getVisible",
            lua.create_function(move |_, _: Variadic<Value>| {
                let ctx = get_context.borrow();
                Ok(if part.is_group() {
                    ctx.host.vanilla_visible(part).unwrap_or(true)
                } else {
                    ctx.host.vanilla_rendered(part)
                })
            })?,
        )?;

        vanilla.set(part.as_str(), table)?;
    }
    lua.globals().set("vanilla_model", vanilla)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_renderer_value;
    use crate::host::{RendererField, RendererValue};
    use mlua::Value;

    #[test]
    fn renderer_values_are_typed_per_field() {
        assert_eq!(
            parse_renderer_value(RendererField::Fov, "setFov", &[Value::Integer(70)]),
            Ok(Some(RendererValue::Fov(70.0)))
        );
        assert_eq!(
            parse_renderer_value(RendererField::RenderFire, "setRenderFire", &[]),
            Ok(None)
        );
        assert!(parse_renderer_value(
            RendererField::ShadowRadius,
            "setShadowRadius",
            &[Value::Boolean(true)]
        )
        .is_err());
    }
}
