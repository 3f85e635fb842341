use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;

pub const ENV_PREFIX: &str = "ACACIA";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub identity_path: String,
    pub identity_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Path prefixes gated by the session guard.
    pub protected_paths: Vec<String>,
    pub login_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Defaults, then `appsettings.<environment>`, then `ACACIA__SECTION__KEY` variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("backend.base_url", "http://localhost:8080")?
            .set_default("backend.identity_path", "/users/auth/me")?
            .set_default("backend.identity_timeout_ms", 5_000_i64)?
            .set_default("backend.connect_timeout_ms", 3_000_i64)?
            .set_default(
                "session.protected_paths",
                vec!["/projects", "/teams", "/api/chat/conversations"],
            )?
            .set_default("session.login_path", "/login")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str().to_lowercase()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("session.protected_paths")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl SessionSettings {
    /// Matches whole path segments: `/projects` guards `/projects/1` but not `/projectsx`.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_paths.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}
