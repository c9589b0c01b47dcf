//! Environment switching for a scripted avatar host.
//!
//! Each environment owns a private view of the host's presentation state
//! (model overrides, callbacks, keybinds, nameplate, ...) and its own script
//! namespace. Host setters called by scripts are recorded into the active
//! environment; switching captures and clears the outgoing environment and
//! replays the incoming one.

mod context;
mod engine;
mod environment;
mod error;
pub mod host;
mod interceptors;
mod loader;
mod lua_host;
mod recency;
mod registry;
mod resources;
mod snapshot;
mod switch;
mod types;

pub use engine::{Engine, EngineSummary, EnvironmentSummary};
pub use environment::{Environment, Lifecycle};
pub use error::EngineError;
pub use recency::RecencyMap;
pub use registry::EnvironmentRegistry;
pub use resources::{FsResources, MemoryResources, ResourceReader};
pub use snapshot::{FieldOverrides, Snapshots, ToggleEntry};
pub use switch::SwitchOutcome;
pub use types::Vec3;
