//! Utility modules for the application layer

pub mod logging;
pub mod output;
