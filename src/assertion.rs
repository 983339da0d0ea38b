//! Signed JWT-bearer assertions.
//!
//! [`AssertionBuilder`] stamps an [`ImpersonationRequest`] with issue/expiry instants, wraps
//! it in the fixed RS256 header, and signs `base64url(header) "." base64url(claims)` with a
//! loaded [`SigningIdentity`]. The resulting [`Assertion`] is immutable and lives for one
//! request.

pub mod claims;
pub mod request;

pub use claims::*;
pub use request::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{
	_prelude::*,
	auth::{SigningIdentity, TokenSecret},
	provider::ProviderDescriptor,
};

/// Builds signed assertions for a single authorization server.
#[derive(Clone, Debug)]
pub struct AssertionBuilder {
	audience: Url,
	scope: String,
	clock_skew: Duration,
}
impl AssertionBuilder {
	/// Captures the audience, default scope, and clock-skew allowance of `descriptor`.
	pub fn from_descriptor(descriptor: &ProviderDescriptor) -> Self {
		Self {
			audience: descriptor.audience.clone(),
			scope: descriptor.scope.clone(),
			clock_skew: descriptor.clock_skew,
		}
	}

	/// Builds an assertion stamped with the current time.
	pub fn build(
		&self,
		request: &ImpersonationRequest,
		identity: &SigningIdentity,
	) -> Result<Assertion> {
		self.build_at(request, identity, OffsetDateTime::now_utc())
	}

	/// Builds an assertion stamped at `now`.
	///
	/// Output is deterministic for identical inputs and timestamp.
	pub fn build_at(
		&self,
		request: &ImpersonationRequest,
		identity: &SigningIdentity,
		now: OffsetDateTime,
	) -> Result<Assertion> {
		request.validate()?;

		if request.issuer != identity.client_email() {
			return Err(Error::invalid_request(format!(
				"`iss` ({}) does not match the service account key's client_email ({})",
				request.issuer,
				identity.client_email()
			)));
		}

		let claims = self.claims_at(request, now)?;
		let signing_input = format!("{}.{}", RS256_HEADER.encode()?, claims.encode()?);
		let signature = identity.sign(signing_input.as_bytes())?;
		let compact = format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature));

		Ok(Assertion { claims, compact: TokenSecret::new(compact) })
	}

	fn claims_at(
		&self,
		request: &ImpersonationRequest,
		now: OffsetDateTime,
	) -> Result<AssertionClaims> {
		// Claims carry whole seconds only.
		let iat = OffsetDateTime::from_unix_timestamp((now - self.clock_skew).unix_timestamp())
			.map_err(|e| Error::invalid_request(format!("clock is out of range: {e}")))?;
		let exp = iat.checked_add(Duration::seconds(request.expiry_duration)).ok_or_else(|| {
			Error::invalid_request(format!(
				"`exp_duration` of {} seconds is out of range",
				request.expiry_duration
			))
		})?;

		Ok(AssertionClaims {
			iss: request.issuer.clone(),
			scope: request.scope.clone().unwrap_or_else(|| self.scope.clone()),
			aud: self.audience.to_string(),
			sub: request.subject.clone(),
			iat,
			exp,
		})
	}
}

/// Signed, time-bounded assertion ready for the JWT-bearer grant.
#[derive(Clone)]
pub struct Assertion {
	claims: AssertionClaims,
	compact: TokenSecret,
}
impl Assertion {
	/// Claim set carried by the assertion.
	pub fn claims(&self) -> &AssertionClaims {
		&self.claims
	}

	/// Compact serialization (`header.claims.signature`). Callers must avoid logging it.
	pub fn expose(&self) -> &str {
		self.compact.expose()
	}

	/// Splits the compact form into its header, claims, and signature segments.
	pub fn segments(&self) -> (&str, &str, &str) {
		let mut parts = self.expose().splitn(3, '.');
		let header = parts.next().unwrap_or_default();
		let claims = parts.next().unwrap_or_default();
		let signature = parts.next().unwrap_or_default();

		(header, claims, signature)
	}
}
impl Debug for Assertion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Assertion")
			.field("claims", &self.claims)
			.field("compact", &"<redacted>")
			.finish()
	}
}
