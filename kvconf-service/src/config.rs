//! Service configuration
//!
//! Settings are read from environment variables with fallback to defaults,
//! matching the deployment where the service runs next to a `redis-server`.

use anyhow::{Context, Result};
use kvconf_client::{RetryPolicy, StoreOptions};
use std::str::FromStr;
use std::time::Duration;

/// Which store implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    /// Process-local store, for running without a store server
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("unknown store backend '{}' (expected redis or memory)", other),
        }
    }
}

/// Config service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// Store implementation
    pub backend: StoreBackend,

    /// Store location and timeouts
    pub store: StoreOptions,

    /// Attempts per key read, including the first
    pub read_attempts: u32,

    /// Delay before the first read retry; doubles per attempt
    pub retry_delay: Duration,

    /// Upper bound for any single retry delay
    pub retry_max_delay: Duration,

    /// Version reported in every record, read once at startup
    pub app_version: Option<String>,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Recognised variables:
    /// - BIND_ADDR (default: 0.0.0.0:5000)
    /// - STORE_BACKEND (redis | memory, default: redis)
    /// - REDIS_HOST (default: redis-server)
    /// - REDIS_PORT (default: 6379)
    /// - REDIS_DB (default: 0)
    /// - STORE_CONNECT_TIMEOUT_MS (default: 2000)
    /// - STORE_RESPONSE_TIMEOUT_MS (default: 1000)
    /// - STORE_READ_ATTEMPTS (default: 1)
    /// - STORE_RETRY_DELAY_MS (default: 50)
    /// - STORE_RETRY_MAX_DELAY_MS (default: 500)
    /// - APP_VERSION (optional)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.backend,
        };

        let host = lookup("REDIS_HOST").unwrap_or(defaults.store.host);

        let port = match lookup("REDIS_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .with_context(|| format!("REDIS_PORT is not a valid port: {}", value))?,
            None => defaults.store.port,
        };

        let db = lookup("REDIS_DB")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(defaults.store.db);

        let connect_timeout = lookup("STORE_CONNECT_TIMEOUT_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.store.connect_timeout);

        let response_timeout = lookup("STORE_RESPONSE_TIMEOUT_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.store.response_timeout);

        let read_attempts = lookup("STORE_READ_ATTEMPTS")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(defaults.read_attempts);

        let retry_delay = lookup("STORE_RETRY_DELAY_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_delay);

        let retry_max_delay = lookup("STORE_RETRY_MAX_DELAY_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_max_delay);

        // An empty APP_VERSION is treated as unset
        let app_version = lookup("APP_VERSION").filter(|v| !v.trim().is_empty());

        Ok(Self {
            bind_addr,
            backend,
            store: StoreOptions::new(host, port)
                .with_db(db)
                .with_connect_timeout(connect_timeout)
                .with_response_timeout(response_timeout),
            read_attempts,
            retry_delay,
            retry_max_delay,
            app_version,
        })
    }

    /// Retry policy applied to each key read
    pub fn read_retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.read_attempts, self.retry_delay, self.retry_max_delay)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.trim().is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.backend == StoreBackend::Redis {
            if self.store.host.trim().is_empty() {
                anyhow::bail!("store host cannot be empty");
            }

            if self.store.port == 0 {
                anyhow::bail!("store port must be greater than 0");
            }

            if self.store.db < 0 {
                anyhow::bail!("store database index cannot be negative");
            }
        }

        if self.store.connect_timeout.is_zero() {
            anyhow::bail!("store connect timeout must be greater than 0");
        }

        if self.store.response_timeout.is_zero() {
            anyhow::bail!("store response timeout must be greater than 0");
        }

        if self.retry_max_delay < self.retry_delay {
            anyhow::bail!("retry max delay cannot be shorter than the initial retry delay");
        }

        if self.read_attempts == 0 {
            anyhow::bail!("read_attempts must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            backend: StoreBackend::Redis,
            store: StoreOptions::new("redis-server", 6379),
            read_attempts: 1,
            retry_delay: Duration::from_millis(50),
            retry_max_delay: Duration::from_millis(500),
            app_version: None,
        }
    }
}
