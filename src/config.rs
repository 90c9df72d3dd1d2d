use thiserror::Error;

/// Default backend address (the bare-payload EMS backend).
///
/// The enveloped deployment historically listened on `:8081`; select it by
/// pointing `EMS_API_BASE_URL` at it and setting `EMS_API_ENVELOPE=true`.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default per-call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(String);

/// Client configuration, resolved once at startup and handed to
/// [`EmsClient::new`](crate::EmsClient::new). Nothing reads the process
/// environment after construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base address without a trailing slash.
    pub base_url: String,
    /// Whether the backend wraps payloads in `{success, data, error}`.
    pub envelope: bool,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            envelope: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_envelope(mut self, envelope: bool) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("EMS_API_BASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url: trim_trailing_slash(base_url),
            envelope: parse_or_default(&lookup, "EMS_API_ENVELOPE", false)?,
            timeout_secs: parse_or_default(&lookup, "EMS_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError(format!("{key} has an invalid value: {raw:?}"))),
        None => Ok(default),
    }
}
