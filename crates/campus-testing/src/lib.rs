//! Test utilities for Campus services.
//!
//! Provides `MockCaller` for minting bearer credentials of synthetic callers.
//! Import in `#[cfg(test)]` blocks and `tests/` only, never in production code.

pub mod auth;
