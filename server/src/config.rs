//! Service configuration loaded from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | required |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |
//! | `STORE_BINDINGS` | `env/db/customer-orders,customer-orders,db/customer-orders` |
//! | `STORE_CANDIDATES` | `env/db/customer-orders,customer-orders,db/customer-orders` |
//! | `REDPANDA_BROKERS` | `localhost:9092` |
//! | `ORDER_TOPIC` | `order-queue` |
//! | `NOTIFY_DELIVERY` | `non-persistent` |
//! | `RESOLVE_TIMEOUT_MS`, `PERSIST_TIMEOUT_MS`, `PUBLISH_TIMEOUT_MS` | `5000` (`0` disables) |
//! | `BIND_ADDR` | `0.0.0.0` |
//! | `HTTP_PORT` | `8080` |
//! | `METRICS_PORT` | `9090` |

use order_intake_core::PipelineConfig;
use order_intake_redpanda::DeliveryMode;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CANDIDATES: &str = "env/db/customer-orders,customer-orders,db/customer-orders";
const DEFAULT_BINDINGS: &str = DEFAULT_CANDIDATES;
const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set but its value is unusable.
    #[error("invalid {var} '{value}': {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// The offending value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Everything the service needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Pool size.
    pub database_max_connections: u32,
    /// Names the pool is registered under.
    pub store_bindings: Vec<String>,
    /// Ordered candidate identifiers tried by the resolver.
    pub store_candidates: Vec<String>,
    /// Broker addresses.
    pub redpanda_brokers: String,
    /// Destination topic for notifications.
    pub order_topic: String,
    /// Notification delivery mode.
    pub delivery_mode: DeliveryMode,
    /// Per-candidate resolution timeout.
    pub resolve_timeout: Option<Duration>,
    /// Insert timeout.
    pub persist_timeout: Option<Duration>,
    /// Publish timeout.
    pub publish_timeout: Option<Duration>,
    /// Listener address for both HTTP servers.
    pub bind_addr: String,
    /// Order API port.
    pub http_port: u16,
    /// Prometheus port.
    pub metrics_port: u16,
}

impl Config {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str, default: &str| {
            lookup(name).unwrap_or_else(|| default.to_string())
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            database_max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                &var("DATABASE_MAX_CONNECTIONS", "10"),
            )?,
            store_bindings: name_list("STORE_BINDINGS", &var("STORE_BINDINGS", DEFAULT_BINDINGS))?,
            store_candidates: name_list(
                "STORE_CANDIDATES",
                &var("STORE_CANDIDATES", DEFAULT_CANDIDATES),
            )?,
            redpanda_brokers: var("REDPANDA_BROKERS", "localhost:9092"),
            order_topic: var("ORDER_TOPIC", order_intake_redpanda::DEFAULT_TOPIC),
            delivery_mode: parse(
                "NOTIFY_DELIVERY",
                &var("NOTIFY_DELIVERY", DeliveryMode::default().as_str()),
            )?,
            resolve_timeout: timeout("RESOLVE_TIMEOUT_MS", lookup("RESOLVE_TIMEOUT_MS"))?,
            persist_timeout: timeout("PERSIST_TIMEOUT_MS", lookup("PERSIST_TIMEOUT_MS"))?,
            publish_timeout: timeout("PUBLISH_TIMEOUT_MS", lookup("PUBLISH_TIMEOUT_MS"))?,
            bind_addr: var("BIND_ADDR", "0.0.0.0"),
            http_port: parse("HTTP_PORT", &var("HTTP_PORT", "8080"))?,
            metrics_port: parse("METRICS_PORT", &var("METRICS_PORT", "9090"))?,
        })
    }

    /// Address of the order API listener.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `BIND_ADDR` is not an IP address.
    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.socket_addr(self.http_port)
    }

    /// Address of the Prometheus listener.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `BIND_ADDR` is not an IP address.
    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.socket_addr(self.metrics_port)
    }

    /// The pipeline's share of the configuration.
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(self.store_candidates.iter().cloned())
            .resolve_timeout(self.resolve_timeout)
            .persist_timeout(self.persist_timeout)
            .publish_timeout(self.publish_timeout)
    }

    fn socket_addr(&self, port: u16) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{port}", self.bind_addr);
        raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: self.bind_addr.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn name_list(var: &'static str, value: &str) -> Result<Vec<String>, ConfigError> {
    let names: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();

    if names.is_empty() {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "at least one name is required".to_string(),
        });
    }
    Ok(names)
}

fn timeout(var: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let millis: u64 = match value {
        Some(raw) => parse(var, &raw)?,
        None => DEFAULT_TIMEOUT_MS,
    };
    Ok((millis > 0).then(|| Duration::from_millis(millis)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    fn load_with(var: &str, value: &str) -> Result<Config, ConfigError> {
        load(&[("DATABASE_URL", "postgres://db/orders"), (var, value)])
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(load(&[]), Err(ConfigError::Missing("DATABASE_URL")));
        assert_eq!(load(&[("DATABASE_URL", " ")]), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn defaults_apply_when_only_the_database_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/orders")]).unwrap();

        assert_eq!(config.database_max_connections, 10);
        assert_eq!(
            config.store_bindings,
            vec!["env/db/customer-orders", "customer-orders", "db/customer-orders"]
        );
        assert!(
            config.store_candidates.iter().all(|name| config.store_bindings.contains(name)),
            "every default candidate resolves without a failed attempt"
        );
        assert_eq!(
            config.store_candidates,
            vec!["env/db/customer-orders", "customer-orders", "db/customer-orders"]
        );
        assert_eq!(config.redpanda_brokers, "localhost:9092");
        assert_eq!(config.order_topic, "order-queue");
        assert_eq!(config.delivery_mode, DeliveryMode::NonPersistent);
        assert_eq!(config.resolve_timeout, Some(Duration::from_millis(5000)));
        assert_eq!(config.persist_timeout, Some(Duration::from_millis(5000)));
        assert_eq!(config.publish_timeout, Some(Duration::from_millis(5000)));
        assert_eq!(config.http_addr().unwrap(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.metrics_addr().unwrap(), "0.0.0.0:9090".parse().unwrap());
    }

    #[test]
    fn overrides_are_honoured() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/orders"),
            ("STORE_CANDIDATES", " primary , , fallback "),
            ("NOTIFY_DELIVERY", "persistent"),
            ("PUBLISH_TIMEOUT_MS", "0"),
            ("RESOLVE_TIMEOUT_MS", "250"),
            ("BIND_ADDR", "127.0.0.1"),
            ("HTTP_PORT", "3000"),
        ])
        .unwrap();

        assert_eq!(config.store_candidates, vec!["primary", "fallback"]);
        assert_eq!(config.delivery_mode, DeliveryMode::Persistent);
        assert_eq!(config.publish_timeout, None);
        assert_eq!(config.resolve_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.http_addr().unwrap(), "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    fn pipeline_config_carries_candidates_in_order() {
        let config = load_with("STORE_CANDIDATES", "a,b,c").unwrap();

        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.candidates, ["a", "b", "c"]);
        assert_eq!(pipeline.persist_timeout, Some(Duration::from_millis(5000)));
    }

    #[test]
    fn unparseable_values_name_the_variable() {
        let err = load_with("HTTP_PORT", "eighty").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "HTTP_PORT", .. }));

        let err = load_with("NOTIFY_DELIVERY", "durable").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "NOTIFY_DELIVERY", .. }));

        let err = load_with("PERSIST_TIMEOUT_MS", "-1").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PERSIST_TIMEOUT_MS", .. }));
    }

    #[test]
    fn empty_name_lists_are_rejected() {
        let err = load_with("STORE_BINDINGS", " , ").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "STORE_BINDINGS", .. }));
    }

    #[test]
    fn bad_bind_address_is_reported() {
        let config = load_with("BIND_ADDR", "not-an-ip").unwrap();
        assert!(matches!(
            config.http_addr(),
            Err(ConfigError::Invalid { var: "BIND_ADDR", .. })
        ));
    }
}
