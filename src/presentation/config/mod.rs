mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    BackendSettings, ENV_PREFIX, LoggingSettings, ServerSettings, SessionSettings, Settings,
};
