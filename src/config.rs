use crate::calculations::SchedulerOptions;
use crate::calendar::DEFAULT_SEARCH_HORIZON_DAYS;
use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const HTTP_ADDR_VAR: &str = "GOALPATH_HTTP_ADDR";
pub const DB_PATH_VAR: &str = "GOALPATH_DB_PATH";
pub const SEARCH_HORIZON_VAR: &str = "GOALPATH_SEARCH_HORIZON_DAYS";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

/// Runtime settings for the binaries, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub http_addr: SocketAddr,
    pub db_path: Option<PathBuf>,
    pub scheduler: SchedulerOptions,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServiceConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_addr = lookup(HTTP_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidValue {
                key: HTTP_ADDR_VAR,
                message: err.to_string(),
            })?;

        let db_path = lookup(DB_PATH_VAR)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        let horizon_days = match lookup(SEARCH_HORIZON_VAR) {
            None => DEFAULT_SEARCH_HORIZON_DAYS,
            Some(raw) => {
                let days = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|err| ConfigError::InvalidValue {
                        key: SEARCH_HORIZON_VAR,
                        message: err.to_string(),
                    })?;
                if days <= 0 {
                    return Err(ConfigError::InvalidValue {
                        key: SEARCH_HORIZON_VAR,
                        message: format!("must be a positive number of days (got {days})"),
                    });
                }
                days
            }
        };

        Ok(Self {
            http_addr,
            db_path,
            scheduler: SchedulerOptions { horizon_days },
        })
    }
}
