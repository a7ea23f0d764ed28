//! Shared test doubles for `punchsync-core` integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use punchsync_core::{
    Clock, ConnectorFactory, DeliveryChannel, FixedConnectors, RecordSource, SyncEngine,
};
use punchsync_domain::{
    AttendanceRecord, Config, DeliveryError, DeliveryOutcome, DeviceProbe, PunchSyncError,
    PunchTime, SourceError,
};
use tokio::time::Instant;

pub fn at(text: &str) -> PunchTime {
    PunchTime::parse(text).expect("valid punch time")
}

pub fn punches(ids: std::ops::RangeInclusive<i64>, text: &str) -> Vec<AttendanceRecord> {
    ids.map(|id| AttendanceRecord::from_id(id, at(text)).with_state(1)).collect()
}

/// Terminal double: scripted replies first, then the standing record set
/// filtered by `since`.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<AttendanceRecord>, SourceError>>>,
    standing: Mutex<Vec<AttendanceRecord>>,
    fetches: Mutex<Vec<(Instant, PunchTime)>>,
    unreachable: bool,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self { unreachable: true, ..Self::default() }
    }

    pub fn push(&self, reply: Result<Vec<AttendanceRecord>, SourceError>) {
        self.script.lock().push_back(reply);
    }

    pub fn set_standing(&self, records: Vec<AttendanceRecord>) {
        *self.standing.lock() = records;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().len()
    }

    pub fn since_values(&self) -> Vec<PunchTime> {
        self.fetches.lock().iter().map(|(_, since)| *since).collect()
    }

    pub fn fetch_instants(&self) -> Vec<Instant> {
        self.fetches.lock().iter().map(|(at, _)| *at).collect()
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn fetch_since(&self, since: PunchTime) -> Result<Vec<AttendanceRecord>, SourceError> {
        self.fetches.lock().push((Instant::now(), since));
        if let Some(reply) = self.script.lock().pop_front() {
            return reply;
        }
        Ok(self.standing.lock().iter().filter(|r| r.timestamp >= since).cloned().collect())
    }

    async fn probe(&self) -> DeviceProbe {
        if self.unreachable {
            return DeviceProbe::unreachable();
        }
        DeviceProbe::reachable([("name".to_string(), "scripted".to_string())].into())
    }
}

/// Endpoint double: scripted replies first, then acceptance.
#[derive(Default)]
pub struct ScriptedChannel {
    script: Mutex<VecDeque<Result<DeliveryOutcome, DeliveryError>>>,
    calls: Mutex<Vec<(Instant, Vec<i64>)>>,
    latency: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    reachable: bool,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self { reachable: true, ..Self::default() }
    }

    pub fn down() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Result<DeliveryOutcome, DeliveryError>) {
        self.script.lock().push_back(reply);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.calls.lock().iter().map(|(at, _)| *at).collect()
    }

    pub fn batches(&self) -> Vec<Vec<i64>> {
        self.calls.lock().iter().map(|(_, ids)| ids.clone()).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryChannel for ScriptedChannel {
    async fn deliver(&self, batch: &[AttendanceRecord]) -> Result<DeliveryOutcome, DeliveryError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.calls.lock().push((Instant::now(), batch.iter().map(|r| r.id).collect()));

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or_else(|| Ok(DeliveryOutcome::accepted()))
    }

    async fn probe(&self) -> bool {
        self.reachable
    }

    fn endpoint(&self) -> String {
        "scripted://endpoint".to_string()
    }
}

/// Factory whose construction always fails.
pub struct BrokenConnectors;

impl ConnectorFactory for BrokenConnectors {
    fn record_source(&self, _config: &Config) -> punchsync_domain::Result<Arc<dyn RecordSource>> {
        Err(PunchSyncError::Configuration("no device configured".into()))
    }

    fn delivery_channel(
        &self,
        _config: &Config,
    ) -> punchsync_domain::Result<Arc<dyn DeliveryChannel>> {
        Err(PunchSyncError::Configuration("no endpoint configured".into()))
    }
}

/// Wall clock under test control.
pub struct ManualClock {
    now: Mutex<PunchTime>,
}

impl ManualClock {
    pub fn new(start: &str) -> Self {
        Self { now: Mutex::new(at(start)) }
    }

    pub fn set(&self, text: &str) {
        *self.now.lock() = at(text);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> PunchTime {
        *self.now.lock()
    }
}

pub struct Harness {
    pub engine: SyncEngine,
    pub source: Arc<ScriptedSource>,
    pub channel: Arc<ScriptedChannel>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        Self::with_parts(config, ScriptedSource::new(), ScriptedChannel::new())
    }

    pub fn with_parts(config: Config, source: ScriptedSource, channel: ScriptedChannel) -> Self {
        let source = Arc::new(source);
        let channel = Arc::new(channel);
        let clock = Arc::new(ManualClock::new("2024-06-10 12:00:00"));
        let connectors = Arc::new(FixedConnectors::new(
            Arc::clone(&source) as Arc<dyn RecordSource>,
            Arc::clone(&channel) as Arc<dyn DeliveryChannel>,
        ));
        let engine =
            SyncEngine::with_clock(config, connectors, Arc::clone(&clock) as Arc<dyn Clock>)
                .expect("valid config");
        Self { engine, source, channel, clock }
    }
}

/// Poll `condition` once per simulated second, up to `limit`.
pub async fn wait_until(limit: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    condition()
}
