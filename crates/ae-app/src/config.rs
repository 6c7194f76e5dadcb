use std::env;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::Context;
use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "https://aeaiou.onrender.com/api/v1";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub request_timeout: Duration,
    /// Where the session is persisted. `None` keeps it in memory only.
    pub data_dir: Option<PathBuf>,
    pub stripe_api_base: String,
    pub stripe_publishable_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval: Duration::from_millis(2000),
            max_poll_attempts: 150,
            request_timeout: Duration::from_secs(30),
            data_dir: dirs::data_dir().map(|dir| dir.join("aeaiou")),
            stripe_api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            stripe_publishable_key: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!("Ignoring unreadable .env file: {}", e);
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let api_base_url = lookup("AEAIOU_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let poll_interval = match lookup("AEAIOU_POLL_INTERVAL_MS") {
            Some(raw) => Duration::from_millis(parse_number(&raw, "AEAIOU_POLL_INTERVAL_MS")?),
            None => defaults.poll_interval,
        };

        let max_poll_attempts = match lookup("AEAIOU_MAX_POLL_ATTEMPTS") {
            Some(raw) => parse_number::<u32>(&raw, "AEAIOU_MAX_POLL_ATTEMPTS")?.max(1),
            None => defaults.max_poll_attempts,
        };

        let request_timeout = match lookup("AEAIOU_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number(&raw, "AEAIOU_REQUEST_TIMEOUT_SECS")?),
            None => defaults.request_timeout,
        };

        let data_dir = lookup("AEAIOU_DATA_DIR")
            .map(PathBuf::from)
            .or(defaults.data_dir);

        Ok(Self {
            api_base_url,
            poll_interval,
            max_poll_attempts,
            request_timeout,
            data_dir,
            stripe_api_base: lookup("AEAIOU_STRIPE_API_BASE").unwrap_or(defaults.stripe_api_base),
            stripe_publishable_key: lookup("AEAIOU_STRIPE_PUBLISHABLE_KEY")
                .filter(|key| !key.trim().is_empty()),
        })
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, key: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{} must be a number, got {:?}", key, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.max_poll_attempts, 150);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("AEAIOU_API_BASE_URL", "http://localhost:8000/api/v1/"),
            ("AEAIOU_POLL_INTERVAL_MS", "500"),
            ("AEAIOU_DATA_DIR", "/tmp/aeaiou-test"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/aeaiou-test")));
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("AEAIOU_MAX_POLL_ATTEMPTS", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("AEAIOU_MAX_POLL_ATTEMPTS"));
    }
}
