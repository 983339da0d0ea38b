//! Service-account credentials: key parsing, the signing identity, and redacted secrets.

pub mod key;
pub mod secret;

pub use key::*;
pub use secret::*;
