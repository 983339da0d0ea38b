//! JWS header and claim set for the JWT-bearer assertion.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Header shared by every assertion: RSA-SHA256 over a JWT payload.
pub const RS256_HEADER: JwsHeader<'static> = JwsHeader { alg: "RS256", typ: "JWT" };

/// The header that describes how the assertion was signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwsHeader<'a> {
	/// Signature algorithm.
	pub alg: &'a str,
	/// Token type.
	pub typ: &'a str,
}
impl JwsHeader<'_> {
	/// Serializes the header as unpadded base64url JSON.
	pub fn encode(&self) -> Result<String> {
		encode_segment(self)
	}
}

/// Claim set of a delegated-authority assertion.
///
/// Field order matches the serialized JSON; no other claims are ever emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssertionClaims {
	/// Issuer: the service account email.
	pub iss: String,
	/// Space-delimited scope requested for the access token.
	pub scope: String,
	/// Audience: the authorization server's token endpoint.
	pub aud: String,
	/// Subject being impersonated.
	pub sub: String,
	/// Issued-at instant, serialized as Unix seconds.
	#[serde(with = "time::serde::timestamp")]
	pub iat: OffsetDateTime,
	/// Expiry instant, serialized as Unix seconds.
	#[serde(with = "time::serde::timestamp")]
	pub exp: OffsetDateTime,
}
impl AssertionClaims {
	/// Serializes the claim set as unpadded base64url JSON.
	pub fn encode(&self) -> Result<String> {
		if self.exp <= self.iat {
			return Err(Error::invalid_request(format!(
				"expiration time {} must be later than issued time {}",
				self.exp.unix_timestamp(),
				self.iat.unix_timestamp()
			)));
		}

		encode_segment(self)
	}

	/// Lifetime of the assertion (`exp - iat`).
	pub fn lifetime(&self) -> Duration {
		self.exp - self.iat
	}
}

fn encode_segment<T>(value: &T) -> Result<String>
where
	T: ?Sized + Serialize,
{
	let json = serde_json::to_vec(value).map_err(Error::signing_failure)?;

	Ok(URL_SAFE_NO_PAD.encode(json))
}
