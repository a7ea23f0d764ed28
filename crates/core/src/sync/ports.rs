//! Port interfaces for synchronization
//!
//! The engine sees the terminal and the receiving endpoint only through these
//! traits. Adapters live in `punchsync-infra`; tests script them in memory.

use std::sync::Arc;

use async_trait::async_trait;
use punchsync_domain::{
    AttendanceRecord, Config, DeliveryError, DeliveryOutcome, DeviceProbe, PunchTime, Result,
    SourceError,
};

/// Where attendance punches come from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every record with `timestamp >= since`.
    async fn fetch_since(&self, since: PunchTime) -> Result<Vec<AttendanceRecord>, SourceError>;

    /// Report reachability plus any device metadata. Never fails.
    async fn probe(&self) -> DeviceProbe;
}

/// Where attendance punches go.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Hand one batch to the endpoint.
    ///
    /// An endpoint rejection is `Ok` with `accepted == false`; only transport
    /// failures are `Err`.
    async fn deliver(&self, batch: &[AttendanceRecord])
        -> Result<DeliveryOutcome, DeliveryError>;

    /// Whether the endpoint answers at all. Never fails.
    async fn probe(&self) -> bool;

    /// Human-readable target, used in log fields.
    fn endpoint(&self) -> String {
        String::from("unknown")
    }
}

/// Builds collaborators from the effective configuration.
///
/// The engine asks for fresh collaborators every cycle so that address
/// changes take effect at the next cycle boundary.
pub trait ConnectorFactory: Send + Sync {
    fn record_source(&self, config: &Config) -> Result<Arc<dyn RecordSource>>;

    fn delivery_channel(&self, config: &Config) -> Result<Arc<dyn DeliveryChannel>>;
}

/// Factory returning the same pre-built collaborators regardless of config.
#[derive(Clone)]
pub struct FixedConnectors {
    source: Arc<dyn RecordSource>,
    channel: Arc<dyn DeliveryChannel>,
}

impl FixedConnectors {
    pub fn new(source: Arc<dyn RecordSource>, channel: Arc<dyn DeliveryChannel>) -> Self {
        Self { source, channel }
    }
}

impl ConnectorFactory for FixedConnectors {
    fn record_source(&self, _config: &Config) -> Result<Arc<dyn RecordSource>> {
        Ok(Arc::clone(&self.source))
    }

    fn delivery_channel(&self, _config: &Config) -> Result<Arc<dyn DeliveryChannel>> {
        Ok(Arc::clone(&self.channel))
    }
}

/// Wall-clock abstraction so cycles can be driven deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> PunchTime;
}

/// Local wall clock, matching the terminal's unzoned timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PunchTime {
        PunchTime::new(chrono::Local::now().naive_local())
    }
}
