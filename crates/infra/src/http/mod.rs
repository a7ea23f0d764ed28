//! HTTP client plumbing shared by endpoint adapters

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
