//! # PunchSync Infrastructure
//!
//! Adapters implementing the ports defined in `punchsync-core`.
//!
//! This crate contains:
//! - The HTTP delivery channel for the receiving endpoint
//! - Terminal adapters (TCP reachability, port detection, attendance-log
//!   export reader)
//! - Configuration loading and saving
//!
//! ## Architecture
//! - Implements traits defined in `punchsync-core`
//! - Contains all "impure" code (sockets, HTTP, filesystem)

pub mod api;
pub mod config;
pub mod connectors;
pub mod device;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::HttpDeliveryChannel;
pub use connectors::InfraConnectors;
pub use device::{detect_port, AttlogSource, TcpDeviceProbe};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
