use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Lua, MultiValue, Result as LuaResult, Table, Value};
use persona_config::PathMode;

use crate::context::EngineContext;
use crate::error::EngineError;

/// Resource paths tried for `name`: the environment's own directories first,
/// then the global ones. Duplicates are dropped, first occurrence wins.
pub(crate) fn candidate_paths(
    env_dirs: &[String],
    global_dirs: &[String],
    mode: PathMode,
    name: &str,
) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for dir in env_dirs.iter().chain(global_dirs) {
        let path = candidate_path(dir, mode, name);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

fn candidate_path(dir: &str, mode: PathMode, name: &str) -> String {
    match mode {
        PathMode::Dotted => {
            let relative = name.replace('.', "/");
            let dir = dir.trim_end_matches('/');
            if dir.is_empty() {
                format!("{relative}.lua")
            } else {
                format!("{dir}/{relative}.lua")
            }
        }
        PathMode::Literal => {
            let joined = format!("{dir}/{name}");
            let components: Vec<&str> = joined
                .split('/')
                .filter(|component| !component.is_empty())
                .collect();
            format!("{}.lua", components.join("/"))
        }
    }
}

/// The environment's script namespace. Reads fall through to the globals,
/// writes stay local. Created on first use and kept for the environment's
/// lifetime.
pub(crate) fn namespace<'lua>(
    lua: &'lua Lua,
    context: &Rc<RefCell<EngineContext>>,
    env_id: &str,
) -> LuaResult<Table<'lua>> {
    {
        let ctx = context.borrow();
        let env = ctx
            .registry
            .lookup(env_id)
            .ok_or_else(|| EngineError::UnknownEnvironment(env_id.to_string()))?;
        if let Some(key) = env.namespace.as_ref() {
            return lua.registry_value(key);
        }
    }

    let table = lua.create_table()?;
    let meta = lua.create_table()?;
    meta.set("__index", lua.globals())?;
    table.set_metatable(Some(meta));
    let key = lua.create_registry_value(table.clone())?;

    let mut ctx = context.borrow_mut();
    let env = ctx
        .registry
        .lookup_mut(env_id)
        .ok_or_else(|| EngineError::UnknownEnvironment(env_id.to_string()))?;
    env.namespace = Some(key);
    Ok(table)
}

/// Runs `source` as a chunk inside `env_id`'s namespace.
pub(crate) fn exec_in<'lua>(
    lua: &'lua Lua,
    context: &Rc<RefCell<EngineContext>>,
    env_id: &str,
    chunk_name: &str,
    source: &str,
    args: MultiValue<'lua>,
) -> LuaResult<MultiValue<'lua>> {
    let env_table = namespace(lua, context, env_id)?;
    lua.load(source)
        .set_name(chunk_name)
        .set_environment(env_table)
        .call(args)
}

/// `require` as seen by scripts: resolves against the active environment.
pub(crate) fn require<'lua>(
    lua: &'lua Lua,
    context: &Rc<RefCell<EngineContext>>,
    name: &str,
) -> LuaResult<MultiValue<'lua>> {
    let env_id = context.borrow().active_id();
    require_in(lua, context, &env_id, name)
}

/// Loads `name` for `env_id`, executing it at most once per environment.
/// The complete result list is cached, including an empty one.
pub(crate) fn require_in<'lua>(
    lua: &'lua Lua,
    context: &Rc<RefCell<EngineContext>>,
    env_id: &str,
    name: &str,
) -> LuaResult<MultiValue<'lua>> {
    let (candidates, resources) = {
        let mut guard = context.borrow_mut();
        let ctx = &mut *guard;
        let default_mode = ctx.path_mode;
        let env = ctx
            .registry
            .lookup_mut(env_id)
            .ok_or_else(|| EngineError::UnknownEnvironment(env_id.to_string()))?;
        if let Some(keys) = env.modules.get(name) {
            let values = keys
                .iter()
                .map(|key| lua.registry_value::<Value>(key))
                .collect::<LuaResult<Vec<_>>>()?;
            log::debug!("require {name} in {env_id}: cached");
            return Ok(MultiValue::from_vec(values));
        }
        if !env.loading.insert(name.to_string()) {
            return Err(EngineError::CyclicRequire(name.to_string()).into());
        }
        let mode = env.path_mode().unwrap_or(default_mode);
        let candidates = candidate_paths(env.script_dirs(), &ctx.global_dirs, mode, name);
        (candidates, ctx.resources.clone())
    };

    let found = candidates
        .iter()
        .find_map(|path| resources.read_resource(path).map(|source| (path, source)));
    let result = match found {
        Some((path, source)) => {
            log::debug!("require {name} in {env_id}: executing {path}");
            let args = MultiValue::from_vec(vec![Value::String(lua.create_string(name)?)]);
            exec_in(lua, context, env_id, path, &source, args)
        }
        None => Err(EngineError::ModuleNotFound {
            name: name.to_string(),
            tried: candidates.clone(),
        }
        .into()),
    };

    let mut ctx = context.borrow_mut();
    let Some(env) = ctx.registry.lookup_mut(env_id) else {
        return result;
    };
    env.loading.remove(name);
    let values = result?.into_vec();
    let keys = values
        .iter()
        .map(|value| lua.create_registry_value(value.clone()))
        .collect::<LuaResult<Vec<_>>>()?;
    env.modules.insert(name.to_string(), keys);
    Ok(MultiValue::from_vec(values))
}

#[cfg(test)]
mod tests {
    use super::{candidate_paths, exec_in, require_in};
    use crate::context::EngineContext;
    use crate::error::EngineError;
    use crate::resources::MemoryResources;
    use mlua::{Lua, MultiValue, Value};
    use persona_config::{EnvironmentDescriptor, PathMode, PersonaConfig};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn setup(resources: MemoryResources) -> (Lua, Rc<RefCell<EngineContext>>) {
        let config = PersonaConfig {
            script_dirs: strings(&["shared"]),
            ..PersonaConfig::default()
        };
        let mut ctx = EngineContext::new(&config, Rc::new(resources));
        ctx.registry
            .register(&EnvironmentDescriptor::new("alice").with_script_dir("alice"))
            .expect("register alice");
        ctx.registry.set_active("alice").expect("activate alice");
        (Lua::new(), Rc::new(RefCell::new(ctx)))
    }

    #[test]
    fn dotted_names_map_to_directories() {
        let paths = candidate_paths(
            &strings(&["alice/"]),
            &strings(&["shared", "alice"]),
            PathMode::Dotted,
            "parts.head",
        );
        assert_eq!(
            paths,
            strings(&["alice/parts/head.lua", "shared/parts/head.lua"])
        );
    }

    #[test]
    fn literal_names_collapse_empty_components() {
        let paths = candidate_paths(
            &strings(&["alice//scripts/"]),
            &[],
            PathMode::Literal,
            "v1.2/main",
        );
        assert_eq!(paths, strings(&["alice/scripts/v1.2/main.lua"]));
    }

    #[test]
    fn module_body_runs_once_and_result_is_cached() {
        let resources = MemoryResources::new()
            .with("alice/counter.lua", "hits = (hits or 0) + 1\nreturn hits, ...")
            .with("shared/quiet.lua", "loaded_quiet = true");
        let (lua, context) = setup(resources);

        let first = require_in(&lua, &context, "alice", "counter").expect("first");
        let second = require_in(&lua, &context, "alice", "counter").expect("second");
        let (hits, name): (i64, String) = lua.unpack_multi(first).expect("first values");
        assert_eq!((hits, name.as_str()), (1, "counter"));
        let (hits, name): (i64, String) = lua.unpack_multi(second).expect("second values");
        assert_eq!((hits, name.as_str()), (1, "counter"));

        let quiet = require_in(&lua, &context, "alice", "quiet").expect("quiet");
        assert!(quiet.into_vec().is_empty());
        let again = require_in(&lua, &context, "alice", "quiet").expect("quiet again");
        assert!(again.into_vec().is_empty());
        let ctx = context.borrow();
        assert!(ctx
            .registry
            .lookup("alice")
            .expect("alice")
            .is_module_cached("quiet"));
    }

    #[test]
    fn globals_written_by_modules_stay_in_the_namespace() {
        let resources = MemoryResources::new().with("alice/main.lua", "greeting = 'hi'");
        let (lua, context) = setup(resources);
        require_in(&lua, &context, "alice", "main").expect("main");
        let global: Value = lua.globals().get("greeting").expect("global lookup");
        assert!(matches!(global, Value::Nil));

        lua.globals().set("shared_value", 7).expect("global");
        let seen: i64 = exec_in(
            &lua,
            &context,
            "alice",
            "probe",
            "return shared_value",
            MultiValue::new(),
        )
        .and_then(|values| lua.unpack_multi(values))
        .expect("probe");
        assert_eq!(seen, 7);
    }

    #[test]
    fn missing_module_lists_every_candidate() {
        let (lua, context) = setup(MemoryResources::new());
        let err = require_in(&lua, &context, "alice", "nowhere").expect_err("missing");
        let expected = EngineError::ModuleNotFound {
            name: "nowhere".to_string(),
            tried: strings(&["alice/nowhere.lua", "shared/nowhere.lua"]),
        };
        assert!(err.to_string().contains(&expected.to_string()));
        let ctx = context.borrow();
        assert!(ctx
            .registry
            .lookup("alice")
            .expect("alice")
            .loading
            .is_empty());
    }
}
