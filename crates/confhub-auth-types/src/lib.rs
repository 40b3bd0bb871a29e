//! Auth types shared across Confhub services.
//!
//! Provides the `IdentityHeaders` extractor for gateway-authenticated requests.

pub mod identity;
