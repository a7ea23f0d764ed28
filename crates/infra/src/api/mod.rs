//! Receiving-endpoint adapter
//!
//! Posts attendance batches as a JSON array and interprets the endpoint's
//! acknowledgement.

pub mod channel;
pub mod response;

pub use channel::HttpDeliveryChannel;
pub use response::parse_acknowledgement;
