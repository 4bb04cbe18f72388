use std::path::Path;

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Per-IP request budget enforced in front of the router.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 2,
            burst_size: 10,
        }
    }
}

/// Settings read from `staff-service.toml`. Every field is optional in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub report_title: String,
    pub report_footer: String,
    /// IANA name; drives "today" for birthday validation and report timestamps.
    pub timezone: String,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            report_title: "Staff Export Report".to_string(),
            report_footer: "Staff Management. Confidential.".to_string(),
            timezone: "UTC".to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            tracing::info!("Config file not found at {path}, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;

        tracing::info!(?config, "Loaded service config from {path}");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(
                timezone = %self.timezone,
                "Invalid timezone, falling back to UTC"
            );
            Tz::UTC
        })
    }
}
