use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_REFERER: &str = "https://yourdomain.com";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:3000,https://decision-ai-frontend.vercel.app";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when the credential is unset or blank; the relay answers with a
    /// warning instead of refusing to start.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub referer: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let api_key = lookup("OPENROUTER_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;

        let timeout_secs = parse_or(
            "REQUEST_TIMEOUT_SECS",
            lookup("REQUEST_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            bail!("invalid REQUEST_TIMEOUT_SECS value: must be greater than zero");
        }

        let allowed_origins = get("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            api_key,
            api_url: get("OPENROUTER_API_URL", DEFAULT_API_URL),
            model: get("OPENROUTER_MODEL", DEFAULT_MODEL),
            referer: get("HTTP_REFERER", DEFAULT_REFERER),
            host: get("HOST", DEFAULT_HOST),
            port,
            allowed_origins,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Blank values fall back to the default, like the string settings do.
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("invalid {} value: {:?}", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.referer, DEFAULT_REFERER);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(
            config.allowed_origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://decision-ai-frontend.vercel.app".to_string(),
            ]
        );
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENROUTER_API_KEY", "   ")]).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn api_key_is_trimmed() {
        let config = config_from(&[("OPENROUTER_API_KEY", " sk-or-123\n")]).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-or-123"));
    }

    #[test]
    fn origins_are_split_and_normalized() {
        let config = config_from(&[(
            "ALLOWED_ORIGINS",
            "https://a.example/ , ,https://b.example",
        )])
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn bad_port_is_a_startup_error() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn timeout_override() {
        let config = config_from(&[("REQUEST_TIMEOUT_SECS", "5")]).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_is_a_startup_error() {
        let err = config_from(&[("REQUEST_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn blank_numbers_use_defaults() {
        let config = config_from(&[("PORT", ""), ("REQUEST_TIMEOUT_SECS", "  ")]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
