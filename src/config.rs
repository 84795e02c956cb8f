use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;

// Runtime settings, read once at startup
#[derive(Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout: Duration,
    pub session_idle: Duration,
    pub host: String,
    pub port: u16,
    pub templates_dir: String,
    pub static_dir: String,
}

impl Config {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("MEDMIND_API_KEY").ok_or(ConfigError::Missing("MEDMIND_API_KEY"))?;

        let timeout_secs = positive_secs(&get, "MEDMIND_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let session_idle_secs =
            positive_secs(&get, "MEDMIND_SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?;

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        Ok(Self {
            api_url: get("MEDMIND_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key,
            model: get("MEDMIND_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            session_idle: Duration::from_secs(session_idle_secs),
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            templates_dir: get("TEMPLATES_DIR").unwrap_or_else(|| "templates".to_string()),
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
        })
    }
}

fn positive_secs<G>(get: &G, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(name) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a positive number of seconds, got {raw:?}"),
        }),
        Ok(secs) => Ok(secs),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .field("session_idle", &self.session_idle)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("templates_dir", &self.templates_dir)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("MEDMIND_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(45));
        assert_eq!(config.session_idle, Duration::from_secs(3600));
        assert_eq!(config.port, 8080);
        assert_eq!(config.templates_dir, "templates");
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert_eq!(
            Config::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("MEDMIND_API_KEY")
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("MEDMIND_API_KEY", "   ")])).unwrap_err(),
            ConfigError::Missing("MEDMIND_API_KEY")
        );
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = Config::from_lookup(lookup(&[
            ("MEDMIND_API_KEY", "sk-test"),
            ("MEDMIND_REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "MEDMIND_REQUEST_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn non_numeric_session_idle_is_invalid() {
        let err = Config::from_lookup(lookup(&[
            ("MEDMIND_API_KEY", "sk-test"),
            ("MEDMIND_SESSION_IDLE_SECS", "forever"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "MEDMIND_SESSION_IDLE_SECS", .. }));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("MEDMIND_API_KEY", "sk-test"),
            ("MEDMIND_API_URL", "http://localhost:8081/v1/chat/completions"),
            ("MEDMIND_MODEL", "local-model"),
            ("MEDMIND_REQUEST_TIMEOUT_SECS", "30"),
            ("MEDMIND_SESSION_IDLE_SECS", "600"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.session_idle, Duration::from_secs(600));
        assert_eq!(config.api_url, "http://localhost:8081/v1/chat/completions");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = Config::from_lookup(lookup(&[("MEDMIND_API_KEY", "sk-secret")])).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
