//! Infrastructure error conversions

mod conversions;

pub use conversions::{delivery_error, InfraError};
