//! REST API access
//!
//! HTTP wrappers, wire types and local-storage token handling.

pub mod client;
pub mod tokens;
pub mod types;

pub use client::*;
