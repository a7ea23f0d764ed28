//! # PunchSync Domain
//!
//! Domain types for the attendance synchronization service.
//!
//! This crate contains:
//! - Attendance records and their wire representation
//! - Delivery outcomes, status snapshots and probe reports
//! - The error taxonomy and `Result` alias
//! - Configuration structures with defaults and validation
//!
//! ## Architecture
//! - No dependencies on other PunchSync crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
