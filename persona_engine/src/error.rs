use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("environment {0:?} is already registered")]
    DuplicateId(String),
    #[error("environment id {0:?} is reserved")]
    ReservedId(String),
    #[error("environment descriptor has no id")]
    MissingId,
    #[error("environment id {0:?} contains unsupported characters")]
    InvalidId(String),
    #[error("no environment registered as {0:?}")]
    UnknownEnvironment(String),
    #[error("{operation} expects a function, got {found}")]
    HandlerType { operation: String, found: String },
    #[error("{operation}: {message}")]
    Argument { operation: String, message: String },
    #[error("module {name:?} not found (tried {})", tried.join(", "))]
    ModuleNotFound { name: String, tried: Vec<String> },
    #[error("module {0:?} required while it is still loading")]
    CyclicRequire(String),
    #[error("environment {0:?} was removed while it was initializing")]
    EnvironmentRemoved(String),
    #[error("auto-run of {id:?} failed in module {module:?}: {message}")]
    AutoRunFailed {
        id: String,
        module: String,
        message: String,
    },
}

impl EngineError {
    pub(crate) fn handler_type(operation: &str, found: &str) -> Self {
        EngineError::HandlerType {
            operation: operation.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn argument(operation: &str, message: impl Into<String>) -> Self {
        EngineError::Argument {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

impl From<EngineError> for mlua::Error {
    fn from(err: EngineError) -> Self {
        mlua::Error::external(err)
    }
}
