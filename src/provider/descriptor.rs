//! Provider descriptor data structures shared by the builder and exchanger.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Google's OAuth 2.0 token endpoint; also the audience of every assertion sent to it.
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
/// Scope requested on behalf of the impersonated subject.
pub const ADMIN_DIRECTORY_USER_SCOPE: &str = "https://www.googleapis.com/auth/admin.directory.user";

/// Immutable description of the authorization server consumed by the flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Token endpoint receiving the JWT-bearer grant.
	pub token_endpoint: Url,
	/// Value of the assertion's `aud` claim.
	pub audience: Url,
	/// Value of the assertion's `scope` claim.
	pub scope: String,
	/// Amount subtracted from the local clock when stamping `iat`.
	pub clock_skew: Duration,
}
impl ProviderDescriptor {
	/// Creates a new builder seeded with Google's defaults.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}

	/// Descriptor for Google's token endpoint and the admin-directory scope.
	pub fn google() -> Result<Self, ProviderDescriptorError> {
		Self::builder().build()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn google_descriptor_uses_fixed_endpoint_and_scope() {
		let descriptor = ProviderDescriptor::google().expect("Google descriptor should build.");

		assert_eq!(descriptor.token_endpoint.as_str(), GOOGLE_TOKEN_ENDPOINT);
		assert_eq!(descriptor.audience, descriptor.token_endpoint);
		assert_eq!(descriptor.scope, ADMIN_DIRECTORY_USER_SCOPE);
		assert!(descriptor.clock_skew.is_zero());
	}
}
