use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medtrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend used when `MEDTRACK_BACKEND_URL` is unset.
pub const DEFAULT_BACKEND_URL: &str = "https://health-project-backend-url.vercel.app";

/// HTTP timeout used when `MEDTRACK_HTTP_TIMEOUT_SECS` is unset or invalid.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const BACKEND_URL_ENV: &str = "MEDTRACK_BACKEND_URL";
pub const HTTP_TIMEOUT_ENV: &str = "MEDTRACK_HTTP_TIMEOUT_SECS";

/// Log filter applied when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medtrack=info,warn"
}

/// Get the application data directory (~/Medtrack/), if a home directory exists.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    /// Read the backend settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank or invalid values
    /// fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup(BACKEND_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);

        let timeout_secs = match lookup(HTTP_TIMEOUT_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(value = %raw, "Ignoring invalid {HTTP_TIMEOUT_ENV}");
                    defaults.timeout_secs
                }
            },
            None => defaults.timeout_secs,
        };

        Self {
            base_url,
            timeout_secs,
        }
    }
}
