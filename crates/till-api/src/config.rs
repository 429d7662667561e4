//! Server configuration read from the environment.

use std::path::PathBuf;

use chrono_tz::Tz;
use till_sales::application::sales_view::DEFAULT_FEED_LIMIT;

use crate::error::AppError;

/// Default local cache directory.
pub const DEFAULT_CACHE_DIR: &str = ".till-cache";

/// Time zone whose calendar defines the daily and monthly boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingZone {
    /// The server's local zone, daylight saving time included.
    Local,
    /// A named IANA zone.
    Named(Tz),
}

/// Runtime configuration of the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PostgreSQL connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Directory of the local JSON cache.
    pub cache_dir: PathBuf,
    /// Number of most recent sales the live feed follows.
    pub sales_feed_limit: usize,
    /// Reporting time zone of the dashboard.
    pub reporting_zone: ReportingZone,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` if it is unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let cache_dir = PathBuf::from(
            lookup("CACHE_DIR").unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string()),
        );

        let sales_feed_limit = match lookup("SALES_FEED_LIMIT") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "SALES_FEED_LIMIT must be a positive integer, got {raw:?}"
                    ))
                })?,
            None => DEFAULT_FEED_LIMIT,
        };

        let reporting_zone = match lookup("REPORTING_TIME_ZONE")
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            Some(name) => ReportingZone::Named(name.parse::<Tz>().map_err(|e| {
                AppError::Config(format!(
                    "REPORTING_TIME_ZONE must be an IANA time zone name, got {name:?}: {e}"
                ))
            })?),
            None => ReportingZone::Local,
        };

        Ok(Self {
            database_url,
            host,
            port,
            cache_dir,
            sales_feed_limit,
            reporting_zone,
        })
    }
}
