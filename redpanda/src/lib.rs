//! Redpanda notifier for the order intake pipeline.
//!
//! This crate implements the [`Notifier`] port from `order-intake-core` with
//! rdkafka, so it works against Redpanda or any other Kafka-compatible broker.
//!
//! # Connection Scope
//!
//! Every [`Notifier::publish`] call builds its own producer, sends exactly one
//! record, waits for the delivery report and releases the producer before
//! returning. Nothing is shared between calls. Producer creation and teardown block on
//! librdkafka, so both run on tokio's blocking pool and never stall the
//! worker serving the request.
//!
//! # Delivery Semantics
//!
//! - [`DeliveryMode::NonPersistent`] (default): `acks=0`, the broker does not
//!   acknowledge the write. Fastest, and a crash of the leader loses the
//!   message.
//! - [`DeliveryMode::Persistent`]: `acks=all`, the send completes only once
//!   every in-sync replica has the record.
//!
//! Records carry the notification text as a UTF-8 payload and no key.
//!
//! # Example
//!
//! ```no_run
//! use order_intake_redpanda::{DeliveryMode, RedpandaNotifier};
//! use order_intake_core::Notifier;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let notifier = RedpandaNotifier::builder()
//!     .brokers("localhost:9092")
//!     .topic("order-queue")
//!     .delivery_mode(DeliveryMode::Persistent)
//!     .timeout(Duration::from_secs(5))
//!     .build()?;
//!
//! notifier.publish("Customer: C1, Product: P9, Qty: 3").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use order_intake_core::notifier::{Notifier, PublishError};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Topic used when none is configured.
pub const DEFAULT_TOPIC: &str = "order-queue";

/// Send timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while configuring a [`RedpandaNotifier`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No broker address was given.
    #[error("Brokers not configured")]
    MissingBrokers,

    /// The topic name is empty.
    #[error("Topic name must not be empty")]
    EmptyTopic,

    /// librdkafka rejected the producer configuration.
    #[error("Invalid producer configuration: {0}")]
    InvalidProducer(String),

    /// An unknown delivery mode string.
    #[error("unknown delivery mode '{0}', expected 'non-persistent' or 'persistent'")]
    UnknownDeliveryMode(String),
}

/// Whether the broker must durably acknowledge each notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Fire and forget (`acks=0`).
    #[default]
    NonPersistent,
    /// Wait for all in-sync replicas (`acks=all`).
    Persistent,
}

impl DeliveryMode {
    /// The producer `acks` setting for this mode.
    #[must_use]
    pub const fn acks(self) -> &'static str {
        match self {
            Self::NonPersistent => "0",
            Self::Persistent => "all",
        }
    }

    /// Configuration name of this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NonPersistent => "non-persistent",
            Self::Persistent => "persistent",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "non-persistent" | "nonpersistent" => Ok(Self::NonPersistent),
            "persistent" => Ok(Self::Persistent),
            other => Err(ConfigError::UnknownDeliveryMode(other.to_string())),
        }
    }
}

/// Publishes order notifications to a single Redpanda topic.
///
/// Cheap to clone and holds no connections between calls.
#[derive(Debug, Clone)]
pub struct RedpandaNotifier {
    brokers: String,
    topic: String,
    timeout: Duration,
    delivery_mode: DeliveryMode,
    compression: String,
}

impl RedpandaNotifier {
    /// Create a notifier for `brokers` with the default topic and settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the broker list is empty or the producer
    /// configuration is rejected.
    pub fn new(brokers: &str) -> Result<Self, ConfigError> {
        Self::builder().brokers(brokers).build()
    }

    /// Create a new builder.
    #[must_use]
    pub fn builder() -> RedpandaNotifierBuilder {
        RedpandaNotifierBuilder::default()
    }

    /// Broker addresses.
    #[must_use]
    pub fn brokers(&self) -> &str {
        &self.brokers
    }

    /// Destination topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Configured delivery mode.
    #[must_use]
    pub const fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }

    /// Per-send timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("message.timeout.ms", self.timeout.as_millis().max(1).to_string())
            .set("acks", self.delivery_mode.acks())
            .set("compression.type", &self.compression);
        config
    }
}

impl Notifier for RedpandaNotifier {
    fn publish<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>> {
        let config = self.client_config();
        let topic = self.topic.clone();
        let message = message.to_owned();
        let timeout = self.timeout;

        Box::pin(async move {
            let delivery = tokio::spawn(deliver(config, topic, message, timeout));
            let (partition, offset) = delivery.await.map_err(|e| {
                PublishError::ConnectionFailed(format!("Delivery task failed: {e}"))
            })??;

            tracing::debug!(
                topic = %self.topic,
                partition = partition,
                offset = offset,
                delivery = %self.delivery_mode,
                "Notification published"
            );
            Ok(())
        })
    }
}

/// Create a producer, send one record, then release the producer.
///
/// Runs as its own task: if the caller stops waiting, the send still settles
/// and the producer is still released. Creating and destroying a librdkafka
/// client both block and run on the blocking pool.
async fn deliver(
    config: ClientConfig,
    topic: String,
    message: String,
    timeout: Duration,
) -> Result<(i32, i64), PublishError> {
    let producer = tokio::task::spawn_blocking(move || config.create::<FutureProducer>())
        .await
        .map_err(|e| PublishError::ConnectionFailed(format!("Producer setup task failed: {e}")))?
        .map_err(|e| PublishError::ConnectionFailed(format!("Failed to create producer: {e}")))?;

    let record = FutureRecord::<(), str>::to(&topic).payload(&message);
    let send_result = producer.send(record, Timeout::After(timeout)).await;

    if let Err(e) = tokio::task::spawn_blocking(move || drop(producer)).await {
        tracing::warn!(error = %e, "Producer release task failed");
    }

    send_result.map_err(|(kafka_error, _)| PublishError::SendFailed {
        destination: topic,
        reason: kafka_error.to_string(),
    })
}

/// Builder for a [`RedpandaNotifier`].
///
/// # Example
///
/// ```no_run
/// use order_intake_redpanda::RedpandaNotifier;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let notifier = RedpandaNotifier::builder()
///     .brokers("localhost:9092,localhost:9093")
///     .compression("lz4")
///     .build()?;
/// assert_eq!(notifier.topic(), "order-queue");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RedpandaNotifierBuilder {
    brokers: Option<String>,
    topic: Option<String>,
    timeout: Option<Duration>,
    delivery_mode: Option<DeliveryMode>,
    compression: Option<String>,
}

impl RedpandaNotifierBuilder {
    /// Set the broker addresses (comma-separated, e.g. `"localhost:9092"`).
    #[must_use]
    pub fn brokers(mut self, brokers: impl Into<String>) -> Self {
        self.brokers = Some(brokers.into());
        self
    }

    /// Set the destination topic.
    ///
    /// Default: `"order-queue"`
    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the per-send timeout, which also bounds delivery retries inside
    /// the producer.
    ///
    /// Default: 5 seconds
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the delivery mode.
    ///
    /// Default: [`DeliveryMode::NonPersistent`]
    #[must_use]
    pub const fn delivery_mode(mut self, mode: DeliveryMode) -> Self {
        self.delivery_mode = Some(mode);
        self
    }

    /// Set the compression codec: `"none"`, `"gzip"`, `"snappy"`, `"lz4"`, `"zstd"`.
    ///
    /// Default: `"none"`
    #[must_use]
    pub fn compression(mut self, compression: impl Into<String>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    /// Build the [`RedpandaNotifier`].
    ///
    /// A producer is created once here and dropped, so invalid settings fail
    /// at startup instead of on the first order. No connection is made.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if brokers are missing, the topic is empty, or
    /// librdkafka rejects the configuration.
    pub fn build(self) -> Result<RedpandaNotifier, ConfigError> {
        let brokers = self
            .brokers
            .filter(|b| !b.trim().is_empty())
            .ok_or(ConfigError::MissingBrokers)?;
        let topic = self.topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        if topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }

        let notifier = RedpandaNotifier {
            brokers,
            topic,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            delivery_mode: self.delivery_mode.unwrap_or_default(),
            compression: self.compression.unwrap_or_else(|| "none".to_string()),
        };

        let _probe: FutureProducer = notifier
            .client_config()
            .create()
            .map_err(|e| ConfigError::InvalidProducer(e.to_string()))?;

        tracing::info!(
            brokers = %notifier.brokers,
            topic = %notifier.topic,
            delivery = %notifier.delivery_mode,
            compression = %notifier.compression,
            "RedpandaNotifier configured"
        );

        Ok(notifier)
    }
}
