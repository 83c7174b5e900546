//! Application layer orchestrating domain logic and infrastructure.

pub mod collect;
pub mod export;
pub mod sanitize;
