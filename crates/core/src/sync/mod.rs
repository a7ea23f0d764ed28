//! Attendance synchronization: fetch from the terminal, deliver to the
//! endpoint, track progress.

pub mod engine;
pub mod ports;
pub mod retry;
pub mod state;
pub mod window;
