//! Data models and structures for the proxy delay checker

pub mod config;
pub mod proxy;

// Re-export main model types
pub use config::Settings;
pub use proxy::{DelayOutcome, ProxyDetails, ProxyKind, ProxyReport, CheckOutcome};
