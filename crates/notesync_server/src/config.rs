//! Server configuration.

use notesync_hub::KeepaliveConfig;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Signing secret used when `NOTESYNC_TOKEN_SECRET` is unset. Accepted in
/// development only.
const DEV_TOKEN_SECRET: &str = "dev-secret-change-me";

/// A configuration problem found at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("invalid value for {name}: {value}")]
    Invalid {
        /// The variable's name.
        name: &'static str,
        /// The offending value.
        value: String,
    },

    /// Production refused to start with the development signing secret.
    #[error("NOTESYNC_TOKEN_SECRET must be set to a non-default value in production")]
    InsecureSecret,

    /// The keepalive timings are inverted; a healthy peer could never
    /// answer a ping before its deadline.
    #[error("NOTESYNC_PING_PERIOD_SECS must stay below NOTESYNC_PONG_WAIT_SECS")]
    KeepaliveOrder,
}

/// Deployment environment, from `NOTESYNC_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local development: defaults are acceptable.
    Development,
    /// Production: the signing secret must be explicitly provided.
    Production,
}

/// Configuration for the service core.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the outer framework should bind to.
    pub bind_addr: SocketAddr,
    /// HMAC signing secret for bearer tokens.
    pub token_secret: String,
    /// Access-token lifetime.
    pub access_ttl: chrono::Duration,
    /// Refresh-token lifetime.
    pub refresh_ttl: chrono::Duration,
    /// Outbound push-queue capacity per connection.
    pub queue_capacity: usize,
    /// Connection liveness timing.
    pub keepalive: KeepaliveConfig,
    /// Interval between blacklist sweeps.
    pub cleanup_interval: Duration,
    /// Deployment environment.
    pub environment: Environment,
}

impl Config {
    /// Builds a configuration from `NOTESYNC_*` environment variables,
    /// with development defaults for everything unset.
    ///
    /// Refuses to start when `NOTESYNC_ENV=production` and the signing
    /// secret is absent or still the development default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match std::env::var("NOTESYNC_ENV").ok().as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let token_secret = std::env::var("NOTESYNC_TOKEN_SECRET")
            .unwrap_or_else(|_| DEV_TOKEN_SECRET.to_string());
        if environment == Environment::Production
            && (token_secret.is_empty() || token_secret == DEV_TOKEN_SECRET)
        {
            return Err(ConfigError::InsecureSecret);
        }
        if environment == Environment::Development && token_secret == DEV_TOKEN_SECRET {
            tracing::warn!("using the development signing secret");
        }

        let bind_addr = parse_var("NOTESYNC_BIND_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));
        let access_minutes: i64 = parse_var("NOTESYNC_ACCESS_TTL_MINUTES")?.unwrap_or(60);
        let refresh_hours: i64 = parse_var("NOTESYNC_REFRESH_TTL_HOURS")?.unwrap_or(168);
        let queue_capacity: usize = parse_var("NOTESYNC_QUEUE_CAPACITY")?.unwrap_or(256);
        let cleanup_secs: u64 = parse_var("NOTESYNC_CLEANUP_INTERVAL_SECS")?.unwrap_or(3600);
        let ping_secs: u64 = parse_var("NOTESYNC_PING_PERIOD_SECS")?.unwrap_or(54);
        let pong_secs: u64 = parse_var("NOTESYNC_PONG_WAIT_SECS")?.unwrap_or(60);
        if ping_secs >= pong_secs {
            return Err(ConfigError::KeepaliveOrder);
        }

        Ok(Config {
            bind_addr,
            token_secret,
            access_ttl: chrono::Duration::minutes(access_minutes),
            refresh_ttl: chrono::Duration::hours(refresh_hours),
            queue_capacity,
            keepalive: KeepaliveConfig::new(
                Duration::from_secs(ping_secs),
                Duration::from_secs(pong_secs),
            ),
            cleanup_interval: Duration::from_secs(cleanup_secs),
            environment,
        })
    }

    /// A development configuration with the given secret; used by tests
    /// and embedded setups that skip the environment.
    pub fn development(token_secret: impl Into<String>) -> Self {
        Config {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            token_secret: token_secret.into(),
            access_ttl: chrono::Duration::minutes(60),
            refresh_ttl: chrono::Duration::hours(168),
            queue_capacity: 256,
            keepalive: KeepaliveConfig::default(),
            cleanup_interval: Duration::from_secs(3600),
            environment: Environment::Development,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment-variable tests mutate process state, so everything runs
    // in this one test to avoid interleaving.
    #[test]
    fn from_env_defaults_and_overrides() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.token_secret, DEV_TOKEN_SECRET);
        assert_eq!(config.access_ttl, chrono::Duration::minutes(60));
        assert_eq!(config.refresh_ttl, chrono::Duration::hours(168));
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.environment, Environment::Development);

        std::env::set_var("NOTESYNC_ENV", "production");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InsecureSecret)
        ));

        std::env::set_var("NOTESYNC_TOKEN_SECRET", "a-real-secret");
        std::env::set_var("NOTESYNC_ACCESS_TTL_MINUTES", "15");
        let config = Config::from_env().unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.access_ttl, chrono::Duration::minutes(15));

        std::env::set_var("NOTESYNC_ACCESS_TTL_MINUTES", "soon");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid { name: "NOTESYNC_ACCESS_TTL_MINUTES", .. })
        ));
        std::env::remove_var("NOTESYNC_ACCESS_TTL_MINUTES");

        std::env::set_var("NOTESYNC_PING_PERIOD_SECS", "25");
        std::env::set_var("NOTESYNC_PONG_WAIT_SECS", "30");
        let config = Config::from_env().unwrap();
        assert_eq!(config.keepalive.ping_period, Duration::from_secs(25));
        assert_eq!(config.keepalive.pong_wait, Duration::from_secs(30));

        // Inverted (or equal) timings refuse to start.
        std::env::set_var("NOTESYNC_PONG_WAIT_SECS", "25");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::KeepaliveOrder)
        ));

        std::env::remove_var("NOTESYNC_ENV");
        std::env::remove_var("NOTESYNC_TOKEN_SECRET");
        std::env::remove_var("NOTESYNC_PING_PERIOD_SECS");
        std::env::remove_var("NOTESYNC_PONG_WAIT_SECS");
    }
}
