//! Typed configuration document for the persona engine.
//!
//! The document lists the global script search path, the environments the
//! avatar can switch between, and which capability categories take part in
//! environment isolation. Parsing and validation happen here so the engine
//! only ever sees typed values.

mod capabilities;
mod document;

pub use capabilities::{Capabilities, Category};
pub use document::{
    is_valid_id, ConfigError, EnvironmentDescriptor, PathMode, PersonaConfig,
    DEFAULT_MENU_TITLE, ROOT_ID,
};
