/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server listen port.
    pub port: u16,
    /// Server bind host.
    pub host: String,
    /// Base URL of the move-suggestion service.
    pub engine_url: String,
    /// Suggestion request timeout in milliseconds.
    pub engine_timeout_ms: u64,
    /// Whether `/engine-move` talks to the suggestion service at all.
    pub engine_enabled: bool,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        AppConfig {
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            host: lookup("HOST").unwrap_or(defaults.host),
            engine_url: lookup("ENGINE_URL").unwrap_or(defaults.engine_url),
            engine_timeout_ms: lookup("ENGINE_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.engine_timeout_ms),
            engine_enabled: lookup("ENGINE_ENABLED")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.engine_enabled),
        }
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: 8082,
            host: "0.0.0.0".to_string(),
            engine_url: "http://localhost:8000/engine".to_string(),
            engine_timeout_ms: 10_000,
            engine_enabled: true,
        }
    }
}
