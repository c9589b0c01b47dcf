use std::collections::{BTreeMap, BTreeSet};

use mlua::RegistryKey;
use persona_config::{EnvironmentDescriptor, PathMode, ROOT_ID};

use crate::snapshot::Snapshots;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    /// Auto-run modules are executing.
    Initializing,
    Initialized,
}

/// One isolated view of host state plus its own script namespace.
#[derive(Debug)]
pub struct Environment {
    id: String,
    pub(crate) lifecycle: Lifecycle,
    script_dirs: Vec<String>,
    autorun: Vec<String>,
    models: Vec<String>,
    path_mode: Option<PathMode>,
    pub(crate) snapshots: Snapshots,
    pub(crate) namespace: Option<RegistryKey>,
    pub(crate) modules: BTreeMap<String, Vec<RegistryKey>>,
    pub(crate) loading: BTreeSet<String>,
}

impl Environment {
    pub(crate) fn root(ordered_parts: bool) -> Self {
        Environment {
            id: ROOT_ID.to_string(),
            lifecycle: Lifecycle::Initialized,
            script_dirs: Vec::new(),
            autorun: Vec::new(),
            models: Vec::new(),
            path_mode: None,
            snapshots: Snapshots::new(ordered_parts),
            namespace: None,
            modules: BTreeMap::new(),
            loading: BTreeSet::new(),
        }
    }

    pub(crate) fn from_descriptor(
        id: String,
        descriptor: &EnvironmentDescriptor,
        ordered_parts: bool,
    ) -> Self {
        Environment {
            id,
            lifecycle: Lifecycle::Uninitialized,
            script_dirs: descriptor.script_dirs.clone(),
            autorun: descriptor.autorun.clone(),
            models: descriptor.models.clone(),
            path_mode: descriptor.path_mode,
            snapshots: Snapshots::new(ordered_parts),
            namespace: None,
            modules: BTreeMap::new(),
            loading: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn script_dirs(&self) -> &[String] {
        &self.script_dirs
    }

    pub fn autorun(&self) -> &[String] {
        &self.autorun
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn path_mode(&self) -> Option<PathMode> {
        self.path_mode
    }

    pub fn snapshots(&self) -> &Snapshots {
        &self.snapshots
    }

    pub fn is_module_cached(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }
}
