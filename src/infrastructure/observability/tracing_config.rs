use crate::presentation::config::{Environment, LoggingSettings};

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub level: String,
    pub json_format: bool,
}

impl TracingConfig {
    /// `LOG_FORMAT=json` forces JSON output regardless of the settings file.
    pub fn from_settings(settings: &LoggingSettings, environment: Environment) -> Self {
        let json_override = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self {
            environment: environment.to_string(),
            level: settings.level.clone(),
            json_format: settings.json || json_override,
        }
    }

    pub fn default_filter(&self) -> String {
        format!("{},acacia_edge=debug,tower_http=debug", self.level)
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            level: "info".to_string(),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}
