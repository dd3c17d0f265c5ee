use std::time::Duration;

/// Default notes endpoint.
pub const DEFAULT_API_URL: &str = "https://notehub-public.goit.study/api/notes";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// A configuration variable held a value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Notes API connection settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Notes endpoint base URL.
    pub api_url: String,
    /// Bearer credential. `None` sends requests unauthenticated and lets
    /// the server reject them.
    pub token: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                                        |
    /// |--------------------------------|------------------------------------------------|
    /// | `NOTEHUB_API_URL`              | `https://notehub-public.goit.study/api/notes`  |
    /// | `NOTEHUB_TOKEN`                | unset                                          |
    /// | `NOTEHUB_REQUEST_TIMEOUT_SECS` | `30`                                           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("NOTEHUB_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "NOTEHUB_API_URL",
                value: api_url,
                reason: "must be an http(s) URL".into(),
            });
        }

        // Used verbatim; a blank value counts as unset.
        let token = lookup("NOTEHUB_TOKEN").filter(|v| !v.trim().is_empty());

        let timeout_secs = parse_var(
            &lookup,
            "NOTEHUB_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_url,
            token,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Parse a numeric variable, falling back to `default` when unset.
///
/// Shared with the application-level configuration.
pub fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
