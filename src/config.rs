use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_url: String,
    pub fallback_path: PathBuf,
    pub default_country: String,
    pub api_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            api_url: "http://localhost:8000".to_string(),
            fallback_path: PathBuf::from("data/fallback-data.json"),
            default_country: "India".to_string(),
            api_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Reads overrides from the environment. Unset or unparsable values keep
    /// their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            api_url: lookup("COVID_API_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.api_url),
            fallback_path: lookup("FALLBACK_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.fallback_path),
            default_country: lookup("DEFAULT_COUNTRY")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.default_country),
            api_timeout: lookup("API_TIMEOUT_SECS")
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.api_timeout),
        }
    }
}
