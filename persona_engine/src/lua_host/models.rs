use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Lua, Result as LuaResult, Table, Value, Variadic};

use super::values::{
    split_receiver, value_to_bool, value_to_f64, value_to_string, values_to_vec3, vec3_to_table,
};
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::host::{PartField, PartKey, PartValue};

/// `models.<group>.<part>...`: every index produces a part handle for the
/// dotted path walked so far. Handles are cached on their parent.
pub(super) fn install_models(lua: &Lua, context: Rc<RefCell<EngineContext>>) -> LuaResult<()> {
    let models = lua.create_table()?;
    attach_children(lua, &models, context, None)?;
    lua.globals().set("models", models)?;
    Ok(())
}

fn attach_children(
    lua: &Lua,
    table: &Table,
    context: Rc<RefCell<EngineContext>>,
    parent: Option<String>,
) -> LuaResult<()> {
    let index = lua.create_function(move |lua_ctx, (this, key): (Table, Value)| {
        let Some(name) = value_to_string(&key) else {
            return Ok(Value::Nil);
        };
        let path = match &parent {
            Some(parent) => format!("{parent}.{name}"),
            None => name,
        };
        let child = part_table(lua_ctx, context.clone(), path)?;
        this.raw_set(key, child.clone())?;
        Ok(Value::Table(child))
    })?;
    let metatable = lua.create_table()?;
    metatable.set("__index", index)?;
    table.set_metatable(Some(metatable));
    Ok(())
}

fn part_table(
    lua: &Lua,
    context: Rc<RefCell<EngineContext>>,
    path: String,
) -> LuaResult<Table<'_>> {
    let part = lua.create_table()?;
    let receiver = part.to_pointer() as usize;

    for field in PartField::ALL {
        let setter_context = context.clone();
        let setter_path = path.clone();
        part.set(
            field.setter(),
            lua.create_function(move |_, args: Variadic<Value>| {
                let (this, values) = split_receiver(receiver, args);
                let value = parse_part_value(field, &values)?;
                let key = PartKey::new(setter_path.clone(), field);
                setter_context.borrow_mut().set_part_field(&key, value);
                Ok(this)
            })?,
        )?;

        let getter_context = context.clone();
        let getter_path = path.clone();
        part.set(
            field.getter(),
            lua.create_function(move |lua_ctx, _: Variadic<Value>| {
                let key = PartKey::new(getter_path.clone(), field);
                let value = getter_context.borrow().host.part_field(&key).cloned();
                match value {
                    Some(value) => part_value_to_lua(lua_ctx, &value),
                    None => Ok(Value::Nil),
                }
            })?,
        )?;
    }

    let rendered_context = context.clone();
    let rendered_path = path.clone();
    part.set(
        "isRendered",
        lua.create_function(move |_, _: Variadic<Value>| {
            Ok(rendered_context.borrow().host.part_rendered(&rendered_path))
        })?,
    )?;

    let name_path = path.clone();
    part.set(
        "getName",
        lua.create_function(move |_, _: Variadic<Value>| Ok(name_path.clone()))?,
    )?;

    attach_children(lua, &part, context, Some(path))?;
    Ok(part)
}

/// No argument (or `nil`) resets the field to the host default.
fn parse_part_value(field: PartField, values: &[Value]) -> Result<Option<PartValue>, EngineError> {
    let operation = field.setter();
    match values.first() {
        None | Some(Value::Nil) => return Ok(None),
        Some(_) => {}
    }
    let first = &values[0];
    let value = match field {
        PartField::Visible => PartValue::Visible(value_to_bool(first)),
        PartField::Opacity => PartValue::Opacity(
            value_to_f64(first)
                .ok_or_else(|| EngineError::argument(operation, "expected a number"))?,
        ),
        PartField::PrimaryTexture => PartValue::PrimaryTexture(
            value_to_string(first)
                .ok_or_else(|| EngineError::argument(operation, "expected a texture name"))?,
        ),
        PartField::Pos => PartValue::Pos(values_to_vec3(operation, values)?),
        PartField::Rot => PartValue::Rot(values_to_vec3(operation, values)?),
        PartField::Scale => PartValue::Scale(values_to_vec3(operation, values)?),
        PartField::Pivot => PartValue::Pivot(values_to_vec3(operation, values)?),
        PartField::Color => PartValue::Color(values_to_vec3(operation, values)?),
    };
    Ok(Some(value))
}

fn part_value_to_lua<'lua>(lua: &'lua Lua, value: &PartValue) -> LuaResult<Value<'lua>> {
    Ok(match value {
        PartValue::Visible(flag) => Value::Boolean(*flag),
        PartValue::Opacity(opacity) => Value::Number(*opacity),
        PartValue::PrimaryTexture(name) => Value::String(lua.create_string(name)?),
        PartValue::Pos(v)
        | PartValue::Rot(v)
        | PartValue::Scale(v)
        | PartValue::Pivot(v)
        | PartValue::Color(v) => Value::Table(vec3_to_table(lua, *v)?),
    })
}

#[cfg(test)]
mod tests {
    use super::{install_models, parse_part_value};
    use crate::context::EngineContext;
    use crate::host::{PartField, PartKey, PartValue};
    use crate::resources::MemoryResources;
    use crate::types::Vec3;
    use mlua::{Lua, Value};
    use persona_config::PersonaConfig;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn nested_handles_address_dotted_paths() {
        let lua = Lua::new();
        let context = Rc::new(RefCell::new(EngineContext::new(
            &PersonaConfig::default(),
            Rc::new(MemoryResources::new()),
        )));
        install_models(&lua, context.clone()).expect("install models");
        lua.load(
            r#"
            models.alice.head:setPos(1, 2, 3):setOpacity(0.5)
            assert(models.alice.head == models.alice.head)
            assert(models.alice.head:getName() == "alice.head")
            assert(models.alice.head:getPos().y == 2)
            models.alice.head:setOpacity()
            models.alice.body:setRot(1, 1, 1)
            models.alice.body.setRot({4, 5, 6})
            "#,
        )
        .exec()
        .expect("script runs");

        let ctx = context.borrow();
        assert_eq!(
            ctx.host.part_field(&PartKey::new("alice.head", PartField::Pos)),
            Some(&PartValue::Pos(Vec3::new(1.0, 2.0, 3.0)))
        );
        assert!(ctx
            .host
            .part_field(&PartKey::new("alice.head", PartField::Opacity))
            .is_none());
        assert_eq!(
            ctx.host.part_field(&PartKey::new("alice.body", PartField::Rot)),
            Some(&PartValue::Rot(Vec3::new(4.0, 5.0, 6.0)))
        );
    }

    #[test]
    fn malformed_vectors_are_argument_errors() {
        let values = vec![Value::Integer(1), Value::Integer(2)];
        assert!(parse_part_value(PartField::Rot, &values).is_err());
        assert_eq!(parse_part_value(PartField::Rot, &[]), Ok(None));
        assert_eq!(
            parse_part_value(PartField::Visible, &[Value::Boolean(false)]),
            Ok(Some(PartValue::Visible(false)))
        );
    }
}
