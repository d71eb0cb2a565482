//! kvconf Feeder
//!
//! Writes `first-name`, `last-name` and `environment` into the key-value
//! store read by the config service.
//!
//! Exits 0 when all three writes succeed and 1 when the store is unreachable
//! or rejects a write.

mod config;
mod feed;

use clap::Parser;
use kvconf_client::{RedisStore, StoreOptions};
use kvconf_core::domain::profile::{
    DEFAULT_ENVIRONMENT, DEFAULT_FIRST_NAME, DEFAULT_LAST_NAME, Profile,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

#[derive(Parser)]
#[command(name = "kvconf-feeder")]
#[command(about = "Write a profile into the key-value store", long_about = None)]
struct Cli {
    /// First name to store
    #[arg(default_value = DEFAULT_FIRST_NAME)]
    first_name: String,

    /// Last name to store
    #[arg(default_value = DEFAULT_LAST_NAME)]
    last_name: String,

    /// Environment to store
    #[arg(long, env = "ENVIRONMENT", default_value = DEFAULT_ENVIRONMENT)]
    environment: String,

    /// Store host
    #[arg(long, env = "REDIS_HOST", default_value = "redis-service")]
    host: String,

    /// Store port
    #[arg(long, env = "REDIS_PORT", default_value_t = 4321)]
    port: u16,

    /// Time allowed to reach the store, in milliseconds
    #[arg(
        long,
        env = "STORE_CONNECT_TIMEOUT_MS",
        default_value_t = 2000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    connect_timeout_ms: u64,
}

impl Cli {
    fn into_config(self) -> Config {
        let timeout = Duration::from_millis(self.connect_timeout_ms);

        Config {
            store: StoreOptions::new(self.host, self.port)
                .with_connect_timeout(timeout)
                .with_response_timeout(timeout),
            profile: Profile::new(self.first_name, self.last_name, self.environment),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvconf_feeder=info,kvconf_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Cli::parse().into_config();

    let store = match RedisStore::new(config.store.clone()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Invalid store options: {}", e);
            return ExitCode::from(feed::EXIT_STORE_FAILURE);
        }
    };

    ExitCode::from(feed::run(&store, &config.profile).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_defaults() {
        let cli = Cli::try_parse_from(["kvconf-feeder"]).unwrap();
        assert_eq!(cli.first_name, "Beyond");
        assert_eq!(cli.last_name, "Creation");
    }

    #[test]
    fn test_positional_overrides() {
        let cli = Cli::try_parse_from([
            "kvconf-feeder",
            "Defeated",
            "Sanity",
            "--environment",
            "production",
            "--host",
            "localhost",
            "--port",
            "6379",
        ])
        .unwrap();

        let config = cli.into_config();
        assert_eq!(config.profile, Profile::new("Defeated", "Sanity", "production"));
        assert_eq!(config.store.addr(), "localhost:6379");
    }

    #[test]
    fn test_only_first_name_given() {
        let cli = Cli::try_parse_from(["kvconf-feeder", "Solo"]).unwrap();
        assert_eq!(cli.first_name, "Solo");
        assert_eq!(cli.last_name, "Creation");
    }

    #[test]
    fn test_rejects_zero_connect_timeout() {
        assert!(Cli::try_parse_from(["kvconf-feeder", "--connect-timeout-ms", "0"]).is_err());

        let cli = Cli::try_parse_from(["kvconf-feeder", "--connect-timeout-ms", "1"]).unwrap();
        assert_eq!(cli.into_config().store.connect_timeout, Duration::from_millis(1));
    }

    #[test]
    fn test_rejects_extra_positional() {
        assert!(Cli::try_parse_from(["kvconf-feeder", "a", "b", "c"]).is_err());
    }
}
