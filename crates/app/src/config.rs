use std::time::Duration;

use notehub_client::config::parse_var;
use notehub_client::{ClientConfig, ConfigError, DEFAULT_PAGE_SIZE};

use crate::query::{QueryConfig, DEFAULT_SEARCH_DEBOUNCE};

/// Everything the `notehub` binary reads at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub query: QueryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// On top of [`ClientConfig::from_env`]:
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `NOTEHUB_PAGE_SIZE`           | `12`    |
    /// | `NOTEHUB_SEARCH_DEBOUNCE_MS`  | `1000`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client = ClientConfig::from_lookup(&lookup)?;

        let page_size: u32 = parse_var(&lookup, "NOTEHUB_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                var: "NOTEHUB_PAGE_SIZE",
                value: page_size.to_string(),
                reason: "must be at least 1".into(),
            });
        }

        let debounce_ms: u64 = parse_var(
            &lookup,
            "NOTEHUB_SEARCH_DEBOUNCE_MS",
            DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
        )?;

        Ok(Self {
            client,
            query: QueryConfig {
                page_size,
                search_debounce: Duration::from_millis(debounce_ms),
            },
        })
    }
}
