// self
use crate::{
	_prelude::*,
	provider::{ADMIN_DIRECTORY_USER_SCOPE, GOOGLE_TOKEN_ENDPOINT, ProviderDescriptor},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A built-in endpoint constant failed to parse.
	#[error("Default endpoint is not a valid URL.")]
	InvalidDefaultEndpoint(#[from] url::ParseError),
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Scope must be a non-empty printable string.
	#[error("Scope must be a non-empty string without control characters.")]
	InvalidScope,
	/// Clock-skew allowance cannot be negative.
	#[error("Clock skew allowance cannot be negative.")]
	NegativeClockSkew,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
	/// Token endpoint; Google's when unset.
	pub token_endpoint: Option<Url>,
	/// Assertion audience; the token endpoint when unset.
	pub audience: Option<Url>,
	/// Requested scope; the admin-directory scope when unset.
	pub scope: Option<String>,
	/// Clock-skew allowance; zero when unset.
	pub clock_skew: Duration,
}
impl ProviderDescriptorBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the assertion audience.
	pub fn audience(mut self, url: Url) -> Self {
		self.audience = Some(url);

		self
	}

	/// Overrides the requested scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Backdates `iat` by `skew` to tolerate authorization servers whose clocks run behind.
	pub fn clock_skew(mut self, skew: Duration) -> Self {
		self.clock_skew = skew;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let token_endpoint = match self.token_endpoint {
			Some(url) => url,
			None => Url::parse(GOOGLE_TOKEN_ENDPOINT)?,
		};
		let audience = self.audience.unwrap_or_else(|| token_endpoint.clone());
		let scope = self.scope.unwrap_or_else(|| ADMIN_DIRECTORY_USER_SCOPE.into());
		let descriptor =
			ProviderDescriptor { token_endpoint, audience, scope, clock_skew: self.clock_skew };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("token", &self.token_endpoint)?;
		validate_endpoint("audience", &self.audience)?;

		if self.scope.trim().is_empty() || self.scope.chars().any(char::is_control) {
			return Err(ProviderDescriptorError::InvalidScope);
		}
		if self.clock_skew.is_negative() {
			return Err(ProviderDescriptorError::NegativeClockSkew);
		}

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
