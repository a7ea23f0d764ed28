//! Engine status snapshot and connectivity reports

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::impl_label_conversions;
use crate::types::record::PunchTime;

/// Lifecycle phase of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    #[default]
    Stopped,
    Running,
    /// Tripped by consecutive failures; only an explicit start leaves it.
    CircuitOpen,
}

impl_label_conversions!(EnginePhase {
    Stopped => "stopped",
    Running => "running",
    CircuitOpen => "circuit_open",
});

/// Point-in-time view of the engine, safe to hand to any caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub running: bool,
    pub phase: EnginePhase,
    pub last_check: Option<PunchTime>,
    pub last_successful_sync: Option<PunchTime>,
    pub error_count: u32,
    pub config: Config,
}

/// Reachability of a terminal plus whatever metadata it disclosed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceProbe {
    pub reachable: bool,
    pub info: BTreeMap<String, String>,
}

impl DeviceProbe {
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn reachable(info: BTreeMap<String, String>) -> Self {
        Self { reachable: true, info }
    }
}

/// Combined diagnostic result of probing both collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub device_reachable: bool,
    pub endpoint_reachable: bool,
    pub device_info: BTreeMap<String, String>,
}

impl ConnectionReport {
    pub fn all_reachable(&self) -> bool {
        self.device_reachable && self.endpoint_reachable
    }
}
