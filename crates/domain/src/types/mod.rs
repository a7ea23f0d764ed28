//! Domain types and models

pub mod delivery;
pub mod record;
pub mod status;

pub use delivery::DeliveryOutcome;
pub use record::{AttendanceRecord, PunchTime};
pub use status::{ConnectionReport, DeviceProbe, EnginePhase, SyncStatus};
