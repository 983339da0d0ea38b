//! Impersonator-level error types shared by the loader, builder, exchanger, and server.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant is terminal for the request that produced it; nothing in the crate retries.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout) while reaching the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Caller supplied an unusable impersonation request.
	#[error("Invalid request: {reason}.")]
	InvalidRequest {
		/// Human-readable description of the rejected input.
		reason: String,
	},
	/// Service account key lacks required material.
	#[error("Service account key is missing the `{field}` field.")]
	MissingField {
		/// Name of the absent JSON field.
		field: &'static str,
	},
	/// Service account key material cannot be parsed.
	#[error("Service account key is malformed: {reason}.")]
	MalformedKey {
		/// Parser-supplied reason string.
		reason: String,
	},
	/// Producing the signed assertion failed after the key was loaded.
	#[error("Failed to sign the assertion: {source}.")]
	SigningFailure {
		/// Underlying signature or encoding failure.
		#[source]
		source: BoxError,
	},
	/// Authorization server answered with a non-200 status.
	#[error("Authorization server rejected the assertion with HTTP {status}: {body}")]
	AuthorizationServer {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Response body, verbatim.
		body: String,
	},
	/// Token endpoint answered 200 with a body that is not a token response.
	#[error("Token endpoint returned a malformed token response: {source}.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl Error {
	/// Builds an [`Error::InvalidRequest`] from any displayable reason.
	pub fn invalid_request(reason: impl Into<String>) -> Self {
		Self::InvalidRequest { reason: reason.into() }
	}

	/// Builds an [`Error::MalformedKey`] from any displayable reason.
	pub fn malformed_key(reason: impl Display) -> Self {
		Self::MalformedKey { reason: reason.to_string() }
	}

	/// Wraps a signing or claim-encoding failure inside [`Error::SigningFailure`].
	pub fn signing_failure(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::SigningFailure { source: Box::new(src) }
	}

	/// Stable label naming the variant, suitable for logs and metrics.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Config(_) => "config",
			Self::Transport(_) => "network",
			Self::InvalidRequest { .. } => "invalid_request",
			Self::MissingField { .. } => "missing_field",
			Self::MalformedKey { .. } => "malformed_key",
			Self::SigningFailure { .. } => "signing_failure",
			Self::AuthorizationServer { .. } => "authorization_server",
			Self::TokenResponseParse { .. } => "token_response_parse",
		}
	}
}

/// Configuration and validation failures raised while wiring the impersonator.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint: {source}.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The token endpoint did not answer within the configured timeout.
	#[error("Network error occurred while calling the token endpoint: request timed out ({source}).")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
