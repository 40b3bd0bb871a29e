//! Test utilities for Confhub services.
//!
//! Import from tests only; never in production code.

pub mod auth;
