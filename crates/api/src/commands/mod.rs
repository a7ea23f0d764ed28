//! Command handlers for the `punchsync` binary
//!
//! Each handler takes the wired [`AppContext`](crate::context::AppContext),
//! prints its result on stdout and returns whether the operation succeeded.

pub mod config;
pub mod connection;
pub mod records;
pub mod run;
pub mod sync;
