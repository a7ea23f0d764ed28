//! # PunchSync Core
//!
//! Synchronization logic with no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the terminal and the receiving endpoint
//! - The sync engine: scheduling loop, windowing, delivery retry policy and
//!   the consecutive-failure circuit breaker
//!
//! ## Architecture Principles
//! - Only depends on `punchsync-domain`
//! - No HTTP, filesystem or socket code
//! - All external collaborators via traits

pub mod sync;

pub use sync::engine::{CycleOutcome, SyncEngine};
pub use sync::ports::{
    Clock, ConnectorFactory, DeliveryChannel, FixedConnectors, RecordSource, SystemClock,
};
pub use sync::retry::{DeliveryFailure, DeliveryPolicy, DeliveryReceipt};
pub use sync::state::SyncState;
pub use sync::window::TimeRange;
