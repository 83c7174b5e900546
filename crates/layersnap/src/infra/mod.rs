//! Infrastructure adapters for configuration, host access, and messaging.

pub mod bridge;
pub mod config;
pub mod fixture;
pub mod host;
