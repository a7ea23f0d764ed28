//! Terminal-side adapters

pub mod attlog;
pub mod probe;

pub use attlog::AttlogSource;
pub use probe::{detect_port, TcpDeviceProbe};
