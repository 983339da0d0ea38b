//! Caller-facing impersonation request and its local validation rules.

// self
use crate::_prelude::*;

/// Assertion lifetime applied when the caller does not supply one (one hour).
pub const DEFAULT_EXPIRY_SECS: i64 = 3600;

/// Delegated-authority request: `issuer` asks to act as `subject`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImpersonationRequest {
	/// Service account email issuing the assertion.
	pub issuer: String,
	/// User the access token will act on behalf of.
	pub subject: String,
	/// Scope override; the provider descriptor's scope is used when `None`.
	pub scope: Option<String>,
	/// Assertion lifetime in seconds.
	pub expiry_duration: i64,
}
impl ImpersonationRequest {
	/// Creates a request with the default one-hour lifetime.
	pub fn new(issuer: impl Into<String>, subject: impl Into<String>) -> Self {
		Self {
			issuer: issuer.into(),
			subject: subject.into(),
			scope: None,
			expiry_duration: DEFAULT_EXPIRY_SECS,
		}
	}

	/// Overrides the assertion lifetime, in seconds.
	///
	/// The value is checked by [`validate`](Self::validate), not here. The authorization
	/// server enforces its own maximum.
	pub fn with_expiry_duration(mut self, secs: i64) -> Self {
		self.expiry_duration = secs;

		self
	}

	/// Overrides the requested scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Checks the fields that can be validated without key material.
	pub fn validate(&self) -> Result<()> {
		if self.issuer.trim().is_empty() {
			return Err(Error::invalid_request("`iss` is required"));
		}
		if self.subject.trim().is_empty() {
			return Err(Error::invalid_request("`sub` is required"));
		}
		if self.scope.as_deref().is_some_and(|scope| scope.trim().is_empty()) {
			return Err(Error::invalid_request("`scope` cannot be empty"));
		}
		if self.expiry_duration <= 0 {
			return Err(Error::invalid_request(format!(
				"`exp_duration` must be a positive number of seconds, got {}",
				self.expiry_duration
			)));
		}

		Ok(())
	}
}
