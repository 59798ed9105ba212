//! Service plumbing shared by Campus services: tracing, HTTP middleware,
//! configuration loading, JSON error bodies and serde helpers.

pub mod config;
pub mod error;
pub mod middleware;
pub mod serde;
pub mod tracing;
