//! Auth types shared across Campus services.
//!
//! Provides the `BearerToken` extractor and JWT access-token validation.

pub mod bearer;
pub mod token;
