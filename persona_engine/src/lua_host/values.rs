use mlua::{Function, IntoLuaMulti, Lua, MultiValue, Result as LuaResult, Table, Value, Variadic};

use crate::error::EngineError;
use crate::host::{Handler, StoreValue};
use crate::types::Vec3;

pub(crate) fn split_self<'lua>(
    args: Variadic<Value<'lua>>,
) -> (Option<Table<'lua>>, Vec<Value<'lua>>) {
    let mut iter = args.into_iter();
    match iter.next() {
        Some(Value::Table(table)) => (Some(table), iter.collect()),
        Some(first) => {
            let mut values = vec![first];
            values.extend(iter);
            (None, values)
        }
        None => (None, Vec::new()),
    }
}

/// Like [`split_self`], but only the receiver table itself counts as `self`.
/// A table passed as the first argument of a dot-call stays an argument.
pub(crate) fn split_receiver<'lua>(
    receiver: usize,
    args: Variadic<Value<'lua>>,
) -> (Option<Table<'lua>>, Vec<Value<'lua>>) {
    let mut values: Vec<Value<'lua>> = args.into_iter().collect();
    match values.first() {
        Some(Value::Table(table)) if table.to_pointer() as usize == receiver => {
            let this = match values.remove(0) {
                Value::Table(table) => Some(table),
                _ => None,
            };
            (this, values)
        }
        _ => (None, values),
    }
}

pub(crate) fn value_to_bool(value: &Value) -> bool {
    match value {
        Value::Boolean(flag) => *flag,
        Value::Integer(i) => *i != 0,
        Value::Number(n) => *n != 0.0,
        Value::String(s) => s
            .to_str()
            .map(|text| text != "0" && text != "false")
            .unwrap_or(false),
        _ => false,
    }
}

pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => text.to_str().ok().map(|s| s.to_string()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Number(n) => Some(*n),
        _ => None,
    }
}

pub(crate) fn describe_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::String(_) => value_to_string(value).unwrap_or_default(),
        other => value_to_string(other).unwrap_or_else(|| format!("<{}>", other.type_name())),
    }
}

/// Parks a Lua function in the registry; anything else is a handler type
/// error raised at the call site.
pub(crate) fn handler_from_value(lua: &Lua, operation: &str, value: Value) -> LuaResult<Handler> {
    match value {
        Value::Function(func) => Ok(Handler::new(lua.create_registry_value(func)?)),
        other => Err(EngineError::handler_type(operation, other.type_name()).into()),
    }
}

pub(crate) fn call_handler<'lua>(
    lua: &'lua Lua,
    handler: &Handler,
    args: impl IntoLuaMulti<'lua>,
) -> LuaResult<MultiValue<'lua>> {
    let func: Function = lua.registry_value(handler.key())?;
    func.call(args)
}

/// Accepts `x, y, z` or a single `{x, y, z}` / `{x = .., y = .., z = ..}`.
pub(crate) fn values_to_vec3(operation: &str, values: &[Value]) -> Result<Vec3, EngineError> {
    if let [Value::Table(table)] = values {
        let read = |index: i64, name: &str| -> Option<f64> {
            table
                .get::<_, Value>(index)
                .ok()
                .as_ref()
                .and_then(value_to_f64)
                .or_else(|| table.get::<_, Value>(name).ok().as_ref().and_then(value_to_f64))
        };
        return match (read(1, "x"), read(2, "y"), read(3, "z")) {
            (Some(x), Some(y), Some(z)) => Ok(Vec3::new(x, y, z)),
            _ => Err(EngineError::argument(operation, "expected a vector table")),
        };
    }
    let numbers: Option<Vec<f64>> = values.iter().map(value_to_f64).collect();
    match numbers.as_deref() {
        Some([x, y, z]) => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(EngineError::argument(
            operation,
            format!("expected three numbers, got {}", values.len()),
        )),
    }
}

pub(crate) fn vec3_to_table<'lua>(lua: &'lua Lua, value: Vec3) -> LuaResult<Table<'lua>> {
    let table = lua.create_table()?;
    table.set("x", value.x)?;
    table.set("y", value.y)?;
    table.set("z", value.z)?;
    table.raw_set(1, value.x)?;
    table.raw_set(2, value.y)?;
    table.raw_set(3, value.z)?;
    Ok(table)
}

pub(crate) fn value_to_store(operation: &str, value: &Value) -> Result<Option<StoreValue>, EngineError> {
    match value {
        Value::Nil => Ok(None),
        Value::Boolean(flag) => Ok(Some(StoreValue::Bool(*flag))),
        Value::Integer(i) => Ok(Some(StoreValue::Integer(*i))),
        Value::Number(n) => Ok(Some(StoreValue::Number(*n))),
        Value::String(text) => text
            .to_str()
            .map(|text| Some(StoreValue::Text(text.to_string())))
            .map_err(|_| EngineError::argument(operation, "store text must be valid UTF-8")),
        other => Err(EngineError::argument(
            operation,
            format!("cannot store a {}", other.type_name()),
        )),
    }
}

pub(crate) fn store_to_value<'lua>(lua: &'lua Lua, value: &StoreValue) -> LuaResult<Value<'lua>> {
    Ok(match value {
        StoreValue::Bool(flag) => Value::Boolean(*flag),
        StoreValue::Integer(i) => Value::Integer(*i),
        StoreValue::Number(n) => Value::Number(*n),
        StoreValue::Text(text) => Value::String(lua.create_string(text)?),
    })
}

#[cfg(test)]
mod tests {
    use super::{split_receiver, value_to_bool, value_to_store, values_to_vec3};
    use crate::error::EngineError;
    use crate::host::StoreValue;
    use crate::types::Vec3;
    use mlua::{Lua, Value, Variadic};

    #[test]
    fn vec3_accepts_numbers_and_tables() {
        let lua = Lua::new();
        let numbers = vec![Value::Number(1.0), Value::Integer(2), Value::Number(3.5)];
        assert_eq!(
            values_to_vec3("setPos", &numbers),
            Ok(Vec3::new(1.0, 2.0, 3.5))
        );

        let table = lua.create_table().expect("table");
        table.set("x", 4.0).expect("x");
        table.set("y", 5.0).expect("y");
        table.set("z", 6.0).expect("z");
        assert_eq!(
            values_to_vec3("setPos", &[Value::Table(table)]),
            Ok(Vec3::new(4.0, 5.0, 6.0))
        );

        let err = values_to_vec3("setPos", &[Value::Number(1.0)]).expect_err("arity");
        assert!(matches!(err, EngineError::Argument { .. }));
    }

    #[test]
    fn only_the_receiver_is_taken_as_self() {
        let lua = Lua::new();
        let receiver = lua.create_table().expect("receiver");
        let vector = lua.create_table().expect("vector");
        let key = receiver.to_pointer() as usize;

        let args = Variadic::from_iter([Value::Table(receiver.clone()), Value::Integer(1)]);
        let (this, values) = split_receiver(key, args);
        assert!(this.is_some());
        assert_eq!(values.len(), 1);

        let args = Variadic::from_iter([Value::Table(vector)]);
        let (this, values) = split_receiver(key, args);
        assert!(this.is_none());
        assert!(matches!(values.as_slice(), [Value::Table(_)]));
    }

    #[test]
    fn store_rejects_tables() {
        let lua = Lua::new();
        let table = lua.create_table().expect("table");
        assert!(value_to_store("store.set", &Value::Table(table)).is_err());
        assert_eq!(value_to_store("store.set", &Value::Nil), Ok(None));
        assert_eq!(
            value_to_store("store.set", &Value::Integer(3)),
            Ok(Some(StoreValue::Integer(3)))
        );
    }

    #[test]
    fn truthiness_follows_host_conventions() {
        assert!(value_to_bool(&Value::Boolean(true)));
        assert!(!value_to_bool(&Value::Integer(0)));
        assert!(!value_to_bool(&Value::Nil));
    }
}
