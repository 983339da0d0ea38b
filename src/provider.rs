//! Provider-facing descriptors for the authorization server.
//!
//! `descriptor` exposes validated metadata ([`ProviderDescriptor`]) covering the HTTPS-only
//! token endpoint, the assertion audience, the requested scope, and the clock-skew
//! allowance applied when stamping assertions.

pub mod descriptor;

pub use descriptor::*;
