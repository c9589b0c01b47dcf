use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::Capabilities;

/// Key of the always-present fallback environment.
pub const ROOT_ID: &str = "root";

pub const DEFAULT_MENU_TITLE: &str = "Environments";

static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("environment id pattern compiles"));

/// Environment ids double as keybind prefixes and menu labels, so they are
/// restricted to a conservative character set.
pub fn is_valid_id(id: &str) -> bool {
    ID_PATTERN.is_match(id)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration document")]
    Invalid(#[from] serde_json::Error),
    #[error("no environment in the configuration registered successfully")]
    NoEnvironments,
}

/// How a module name maps onto a resource path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMode {
    /// `foo.bar` resolves to `<dir>/foo/bar.lua`.
    #[default]
    Dotted,
    /// The name is used as-is; empty path components are collapsed.
    Literal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub script_dirs: Vec<String>,
    #[serde(default)]
    pub autorun: Vec<String>,
    /// Top-level model groups owned by the environment.
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub path_mode: Option<PathMode>,
}

impl EnvironmentDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        EnvironmentDescriptor {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_script_dir(mut self, dir: impl Into<String>) -> Self {
        self.script_dirs.push(dir.into());
        self
    }

    pub fn with_autorun(mut self, module: impl Into<String>) -> Self {
        self.autorun.push(module.into());
        self
    }

    pub fn with_model(mut self, group: impl Into<String>) -> Self {
        self.models.push(group.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Global fallback search directories, searched after an environment's own.
    #[serde(default)]
    pub script_dirs: Vec<String>,
    #[serde(default)]
    pub path_mode: PathMode,
    /// Replay per-part overrides in recency order instead of map order.
    #[serde(default = "default_true")]
    pub ordered_model_replay: bool,
    #[serde(default)]
    pub menu_title: Option<String>,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub environments: Vec<EnvironmentDescriptor>,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        PersonaConfig {
            script_dirs: Vec::new(),
            path_mode: PathMode::default(),
            ordered_model_replay: true,
            menu_title: None,
            capabilities: Capabilities::all_enabled(),
            environments: Vec::new(),
        }
    }
}

impl PersonaConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn menu_title(&self) -> &str {
        self.menu_title.as_deref().unwrap_or(DEFAULT_MENU_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_id, ConfigError, PathMode, PersonaConfig, ROOT_ID};
    use crate::Category;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_full_document() {
        let raw = r#"{
            "script_dirs": ["shared"],
            "path_mode": "literal",
            "ordered_model_replay": false,
            "menu_title": "Personas",
            "capabilities": { "store": false },
            "environments": [
                { "id": "alice", "default": true, "script_dirs": ["alice"],
                  "autorun": ["main", "extras.hats"], "models": ["alice"] },
                { "script_dirs": ["nobody"] }
            ]
        }"#;
        let config = PersonaConfig::from_json_str(raw).expect("config parses");
        assert_eq!(config.script_dirs, vec!["shared"]);
        assert_eq!(config.path_mode, PathMode::Literal);
        assert!(!config.ordered_model_replay);
        assert_eq!(config.menu_title(), "Personas");
        assert!(!config.capabilities.is_enabled(Category::Store));
        assert_eq!(config.environments.len(), 2);
        let alice = &config.environments[0];
        assert_eq!(alice.id.as_deref(), Some("alice"));
        assert!(alice.default);
        assert_eq!(alice.autorun, vec!["main", "extras.hats"]);
        assert!(config.environments[1].id.is_none());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = PersonaConfig::from_json_str("{}").expect("config parses");
        assert!(config.ordered_model_replay);
        assert_eq!(config.path_mode, PathMode::Dotted);
        assert_eq!(config.menu_title(), "Environments");
        assert!(config.environments.is_empty());
    }

    #[test]
    fn missing_file_reports_read_error() {
        let dir = tempdir().expect("tempdir");
        let err = PersonaConfig::from_json_file(&dir.path().join("absent.json"))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("persona.json");
        fs::write(&path, "{ \"environments\": 3 }").expect("write config");
        let err = PersonaConfig::from_json_file(&path).expect_err("bad shape");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn id_pattern_rejects_separators() {
        assert!(is_valid_id("alice"));
        assert!(is_valid_id("night-shift_2"));
        assert!(is_valid_id(ROOT_ID));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("a/b"));
        assert!(!is_valid_id("with space"));
    }
}
