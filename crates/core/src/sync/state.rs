//! Engine state shared between the loop, forced syncs and status readers

use parking_lot::RwLock;
use punchsync_domain::{Config, EnginePhase, PunchTime, SyncStatus};

#[derive(Debug, Clone, Default)]
struct Fields {
    phase: EnginePhase,
    last_check: Option<PunchTime>,
    last_successful_sync: Option<PunchTime>,
    consecutive_errors: u32,
}

/// Single-writer/multi-reader state of the sync engine.
///
/// Every transition happens under one write lock, so a reader never observes
/// a half-applied cycle result.
#[derive(Debug, Default)]
pub struct SyncState {
    fields: RwLock<Fields>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent status view paired with the given config.
    pub fn snapshot(&self, config: Config) -> SyncStatus {
        let fields = self.fields.read().clone();
        SyncStatus {
            running: fields.phase == EnginePhase::Running,
            phase: fields.phase,
            last_check: fields.last_check,
            last_successful_sync: fields.last_successful_sync,
            error_count: fields.consecutive_errors,
            config,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.fields.read().phase
    }

    pub fn is_running(&self) -> bool {
        self.phase() == EnginePhase::Running
    }

    pub fn last_successful_sync(&self) -> Option<PunchTime> {
        self.fields.read().last_successful_sync
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.fields.read().consecutive_errors
    }

    /// Enter `Running`. Returns `false` when already running.
    ///
    /// Leaving `CircuitOpen` clears the failure counter.
    pub fn begin_running(&self) -> bool {
        let mut fields = self.fields.write();
        match fields.phase {
            EnginePhase::Running => false,
            EnginePhase::CircuitOpen => {
                fields.consecutive_errors = 0;
                fields.phase = EnginePhase::Running;
                true
            }
            EnginePhase::Stopped => {
                fields.phase = EnginePhase::Running;
                true
            }
        }
    }

    /// Enter `Stopped` unless the breaker already tripped.
    pub fn mark_stopped(&self) {
        let mut fields = self.fields.write();
        if fields.phase == EnginePhase::Running {
            fields.phase = EnginePhase::Stopped;
        }
    }

    /// Quiet cycle: only `last_check` moves.
    pub fn record_quiet_cycle(&self, now: PunchTime) {
        self.fields.write().last_check = Some(now);
    }

    /// Delivered cycle: advance the cursor and reset the failure counter.
    pub fn record_success(&self, now: PunchTime) {
        let mut fields = self.fields.write();
        fields.last_successful_sync = Some(now);
        fields.last_check = Some(now);
        fields.consecutive_errors = 0;
    }

    /// Failed cycle. `checked_at` is set for fetch-side failures only.
    ///
    /// Returns `true` when this failure tripped the breaker.
    pub fn record_failure(&self, checked_at: Option<PunchTime>, threshold: u32) -> bool {
        let mut fields = self.fields.write();
        fields.consecutive_errors = fields.consecutive_errors.saturating_add(1);
        if let Some(at) = checked_at {
            fields.last_check = Some(at);
        }
        if fields.consecutive_errors >= threshold && fields.phase != EnginePhase::CircuitOpen {
            fields.phase = EnginePhase::CircuitOpen;
            return true;
        }
        false
    }
}
