//! Sync engine: scheduling loop, cycle execution and circuit breaker.
//!
//! One background task runs the loop started by [`SyncEngine::start`]. A
//! cycle fetches the current window from the terminal, delivers the batch
//! through the retry policy and records the result in [`SyncState`]. Forced
//! and scheduled cycles share a single-slot lock, so they never overlap.
//!
//! Cancellation is observed between cycles only, while the loop sleeps in
//! one-second checkpoints. An in-flight delivery (retries included) always
//! completes first.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use parking_lot::{Mutex, RwLock};
use punchsync_domain::{
    AttendanceRecord, Config, ConnectionReport, EnginePhase, PunchSyncError, PunchTime, Result,
    SyncStatus,
};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::sync::ports::{Clock, ConnectorFactory, SystemClock};
use crate::sync::retry::{DeliveryFailure, DeliveryPolicy, DeliveryReceipt};
use crate::sync::state::SyncState;
use crate::sync::window::{retain_since, window_start, TimeRange};

/// Granularity at which the interval sleep observes cancellation.
const CANCEL_CHECKPOINT: Duration = Duration::from_secs(1);

/// Result of one synchronization cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The window was empty.
    NoRecords,
    /// The endpoint accepted the batch; the cursor moved to the cycle start.
    Delivered(DeliveryReceipt),
    /// Retries exhausted; the cursor did not move.
    DeliveryFailed(DeliveryFailure),
    /// The terminal could not be read, or collaborators could not be built.
    Faulted(PunchSyncError),
}

impl CycleOutcome {
    /// Quiet cycles count as successful.
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::NoRecords | Self::Delivered(_))
    }

    /// Whether the next wait is the error cooldown.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Faulted(_))
    }

    pub fn delivered_count(&self) -> usize {
        match self {
            Self::Delivered(receipt) => receipt.record_count,
            _ => 0,
        }
    }
}

struct EngineInner {
    connectors: Arc<dyn ConnectorFactory>,
    clock: Arc<dyn Clock>,
    config: RwLock<Config>,
    state: SyncState,
    cycle_lock: tokio::sync::Mutex<()>,
    cancel: Mutex<CancellationToken>,
    task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

/// Orchestrates fetch, delivery and state for the attendance mirror.
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl SyncEngine {
    /// Build an engine on the system clock. Fails when `config` is invalid.
    pub fn new(config: Config, connectors: Arc<dyn ConnectorFactory>) -> Result<Self> {
        Self::with_clock(config, connectors, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: Config,
        connectors: Arc<dyn ConnectorFactory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(EngineInner {
                connectors,
                clock,
                config: RwLock::new(config),
                state: SyncState::new(),
                cycle_lock: tokio::sync::Mutex::new(()),
                cancel: Mutex::new(CancellationToken::new()),
                task: tokio::sync::Mutex::new(None),
            }),
        })
    }

    /// Begin the background loop. A no-op when already running; restarting
    /// from `CircuitOpen` clears the failure counter.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        if !self.inner.state.begin_running() {
            warn!("Sync engine already running, start ignored");
            return;
        }

        let token = CancellationToken::new();
        let previous = std::mem::replace(&mut *self.inner.cancel.lock(), token.clone());
        previous.cancel();

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            inner.run_loop(token).await;
        });
        *self.inner.task.lock().await = Some(handle);

        info!("Sync engine started");
    }

    /// Request the loop to end and wait up to `stop_timeout_seconds` for it.
    ///
    /// The engine is marked stopped even if the loop does not exit in time.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        self.inner.cancel.lock().cancel();

        let timeout = self.inner.config.read().sync.stop_timeout();
        let handle = self.inner.task.lock().await.take();
        if let Some(handle) = handle {
            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(())) => debug!("Sync loop joined"),
                Ok(Err(join_error)) => error!(error = %join_error, "Sync loop task failed"),
                Err(_) => warn!(
                    timeout_secs = timeout.as_secs(),
                    "Sync loop did not exit in time, abandoning it"
                ),
            }
        }

        self.inner.state.mark_stopped();
        info!("Sync engine stopped");
    }

    /// Run one cycle on the caller's task, serialized with the loop.
    #[instrument(skip(self))]
    pub async fn force_sync(&self) -> CycleOutcome {
        info!("Forced sync requested");
        let config = self.config();
        self.inner.run_cycle(&config).await
    }

    /// Status snapshot. Never waits on a running cycle.
    pub fn status(&self) -> SyncStatus {
        self.inner.state.snapshot(self.config())
    }

    pub fn phase(&self) -> EnginePhase {
        self.inner.state.phase()
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.is_running()
    }

    /// Probe the terminal and the endpoint independently. Never fails.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> ConnectionReport {
        let config = self.config();

        let device = async {
            match self.inner.connectors.record_source(&config) {
                Ok(source) => source.probe().await,
                Err(err) => {
                    warn!(error = %err, "Cannot build record source for probe");
                    Default::default()
                }
            }
        };
        let endpoint = async {
            match self.inner.connectors.delivery_channel(&config) {
                Ok(channel) => channel.probe().await,
                Err(err) => {
                    warn!(error = %err, "Cannot build delivery channel for probe");
                    false
                }
            }
        };
        let (device, endpoint_reachable) = tokio::join!(device, endpoint);

        info!(
            device_reachable = device.reachable,
            endpoint_reachable,
            "Connection test finished"
        );
        ConnectionReport {
            device_reachable: device.reachable,
            endpoint_reachable,
            device_info: device.info,
        }
    }

    pub fn config(&self) -> Config {
        self.inner.config.read().clone()
    }

    /// Replace the effective config. Takes effect at the next cycle.
    pub fn update_config(&self, config: Config) -> Result<()> {
        config.validate()?;
        *self.inner.config.write() = config;
        info!("Configuration updated, effective from next cycle");
        Ok(())
    }

    /// Fetch records in an operator-supplied inclusive range.
    ///
    /// Malformed bounds surface as `Configuration` errors. State is untouched.
    #[instrument(skip(self))]
    pub async fn fetch_range(&self, start: &str, end: &str) -> Result<Vec<AttendanceRecord>> {
        let range = TimeRange::parse(start, end)?;
        let config = self.config();
        let source = self.inner.connectors.record_source(&config)?;
        let records = source.fetch_since(range.start).await?;
        let records = range.retain(records);
        info!(record_count = records.len(), "Fetched records for manual range");
        Ok(records)
    }

    /// Deliver an operator-selected batch through the retry policy.
    ///
    /// Does not take the cycle lock and does not touch state.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub async fn send_manual(&self, records: &[AttendanceRecord]) -> Result<DeliveryReceipt> {
        if records.is_empty() {
            return Err(PunchSyncError::Configuration("no records selected".to_string()));
        }
        let config = self.config();
        let channel = self.inner.connectors.delivery_channel(&config)?;
        let policy = DeliveryPolicy::from_config(&config.sync);
        Ok(policy.deliver(channel.as_ref(), records).await?)
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.inner.cancel.lock().cancel();
    }
}

impl EngineInner {
    async fn run_loop(self: Arc<Self>, token: CancellationToken) {
        let mut first = true;
        loop {
            if token.is_cancelled() || !self.state.is_running() {
                break;
            }

            if first {
                first = false;
                let deferred = {
                    let config = self.config.read();
                    (!config.sync.sync_on_startup).then(|| config.sync.polling_interval())
                };
                if let Some(interval) = deferred {
                    if !pause(interval, &token).await {
                        break;
                    }
                }
            }

            let config = self.config.read().clone();
            let outcome = self.run_cycle(&config).await;
            if self.state.phase() == EnginePhase::CircuitOpen {
                error!(
                    error_count = self.state.consecutive_errors(),
                    "Circuit open, sync loop halted until restarted"
                );
                break;
            }

            let wait = if outcome.is_fault() {
                config.sync.error_cooldown()
            } else {
                config.sync.polling_interval()
            };
            debug!(wait_secs = wait.as_secs(), "Sleeping until next cycle");
            if !pause(wait, &token).await {
                break;
            }
        }
        debug!("Sync loop exited");
    }

    async fn run_cycle(&self, config: &Config) -> CycleOutcome {
        let _slot = self.cycle_lock.lock().await;

        let now = self.clock.now();
        let since = window_start(self.state.last_successful_sync(), now, lookback(config));
        debug!(window_start = %since, "Starting sync cycle");

        let source = match self.connectors.record_source(config) {
            Ok(source) => source,
            Err(err) => return self.fault(now, err, config),
        };
        let records = match source.fetch_since(since).await {
            Ok(records) => retain_since(records, since),
            Err(err) => return self.fault(now, err.into(), config),
        };

        if records.is_empty() {
            self.state.record_quiet_cycle(now);
            debug!(window_start = %since, "No new records");
            return CycleOutcome::NoRecords;
        }

        info!(record_count = records.len(), window_start = %since, "Delivering new records");
        let channel = match self.connectors.delivery_channel(config) {
            Ok(channel) => channel,
            Err(err) => return self.fault(now, err, config),
        };

        match DeliveryPolicy::from_config(&config.sync).deliver(channel.as_ref(), &records).await {
            Ok(receipt) => {
                self.state.record_success(now);
                info!(
                    record_count = receipt.record_count,
                    attempts = receipt.attempts,
                    "Sync cycle delivered"
                );
                CycleOutcome::Delivered(receipt)
            }
            Err(failure) => {
                let tripped =
                    self.state.record_failure(None, config.sync.max_consecutive_errors);
                error!(
                    endpoint = %channel.endpoint(),
                    record_count = failure.record_count,
                    attempts = failure.attempts,
                    error_count = self.state.consecutive_errors(),
                    error = %failure.last_error,
                    "Sync cycle delivery failed"
                );
                if tripped {
                    self.open_circuit();
                }
                CycleOutcome::DeliveryFailed(failure)
            }
        }
    }

    fn fault(&self, now: PunchTime, err: PunchSyncError, config: &Config) -> CycleOutcome {
        let tripped = self.state.record_failure(Some(now), config.sync.max_consecutive_errors);
        error!(
            device = %config.device_address(),
            category = err.category(),
            error_count = self.state.consecutive_errors(),
            error = %err,
            "Sync cycle failed before delivery"
        );
        if tripped {
            self.open_circuit();
        }
        CycleOutcome::Faulted(err)
    }

    fn open_circuit(&self) {
        error!(
            error_count = self.state.consecutive_errors(),
            "Consecutive failure threshold reached, opening circuit"
        );
        self.cancel.lock().cancel();
    }
}

fn lookback(config: &Config) -> TimeDelta {
    i64::try_from(config.sync.bootstrap_lookback_hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .unwrap_or(TimeDelta::MAX)
}

/// Sleep for `duration` in checkpoints. Returns `false` if cancelled.
///
/// A duration past the end of the clock sleeps until cancelled.
async fn pause(duration: Duration, token: &CancellationToken) -> bool {
    let deadline = Instant::now().checked_add(duration);
    loop {
        if token.is_cancelled() {
            return false;
        }
        let step = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return true;
                }
                (deadline - now).min(CANCEL_CHECKPOINT)
            }
            None => CANCEL_CHECKPOINT,
        };
        tokio::select! {
            () = token.cancelled() => return false,
            () = tokio::time::sleep(step) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn pause_past_the_end_of_the_clock_waits_for_cancel() {
        let token = CancellationToken::new();
        let child = token.clone();
        let waiter = tokio::spawn(async move { pause(Duration::MAX, &child).await });

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!waiter.is_finished());

        token.cancel();
        assert!(!waiter.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_completes_after_duration() {
        let token = CancellationToken::new();
        let started = Instant::now();
        assert!(pause(Duration::from_secs(90), &token).await);
        assert!(started.elapsed() >= Duration::from_secs(90));
    }

    #[test]
    fn oversized_lookback_saturates() {
        let mut config = Config::default();
        config.sync.bootstrap_lookback_hours = u64::MAX;
        assert_eq!(lookback(&config), TimeDelta::MAX);
    }
}
