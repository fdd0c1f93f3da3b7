//! Service configuration parsed from environment variables.
//!
//! - `PORT`: listen port, default 3000
//! - `VERITAS_API_URL`: base URL of the backend hit by the startup probe
//! - `CHAT_REPLY_MIN_DELAY_MS` / `CHAT_REPLY_MAX_DELAY_MS`: simulated
//!   thinking time bounds, default 1000 / 3000

use crate::chat::simulator::{DEFAULT_MAX_DELAY_MS, DEFAULT_MIN_DELAY_MS, ReplyDelay};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
    #[error("reply delay range is empty: min {min_ms}ms >= max {max_ms}ms")]
    EmptyDelayRange { min_ms: u64, max_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Probe base URL without trailing slash. `None` leaves the probe loading.
    pub api_url: Option<String>,
    pub reply_delay: ReplyDelay,
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse or the delay
    /// range is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse("PORT", DEFAULT_PORT)?;
        let api_url = std::env::var("VERITAS_API_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let min_ms = env_parse("CHAT_REPLY_MIN_DELAY_MS", DEFAULT_MIN_DELAY_MS)?;
        let max_ms = env_parse("CHAT_REPLY_MAX_DELAY_MS", DEFAULT_MAX_DELAY_MS)?;
        if min_ms >= max_ms {
            return Err(ConfigError::EmptyDelayRange { min_ms, max_ms });
        }

        Ok(Self { port, api_url, reply_delay: ReplyDelay { min_ms, max_ms } })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, api_url: None, reply_delay: ReplyDelay::default() }
    }
}

fn env_parse<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
