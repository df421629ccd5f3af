//! Outbound HTTP plumbing shared by all providers.

pub mod client;

pub use client::build_http_client;
