//! Stateless OAuth 2.0 JWT-bearer broker: sign service-account assertions from caller-supplied
//! keys and exchange them for access tokens that act on behalf of a user.
//!
//! The crate is layered bottom-up:
//!
//! - [`auth`] parses the service account key and loads the RS256 signing identity.
//! - [`assertion`] stamps and signs the JWT claim set.
//! - [`exchange`] posts the assertion to the token endpoint through [`http::TokenHttpClient`].
//! - [`broker`] runs the whole flow for one request.
//! - [`server`] and [`cli`] expose the broker as a small HTTP service.
//!
//! Nothing is cached between requests and no key material is written anywhere.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod assertion;
pub mod auth;
pub mod broker;
pub mod cli;
pub mod error;
pub mod exchange;
pub mod http;
pub mod obs;
pub mod provider;
pub mod server;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::time::Duration as StdDuration;
	// self
	use crate::{
		broker::{Broker, ReqwestBroker},
		http::{DEFAULT_TIMEOUT, ReqwestHttpClient},
		provider::ProviderDescriptor,
	};

	/// PKCS#8 PEM of the RSA key used by fixtures.
	pub const FIXTURE_PKCS8_PEM: &str = include_str!("../tests/fixtures/service_account_pkcs8.pem");
	/// PKCS#1 PEM of the same RSA key.
	pub const FIXTURE_PKCS1_PEM: &str = include_str!("../tests/fixtures/service_account_pkcs1.pem");
	/// Service account email carried by [`fixture_key_json`].
	pub const FIXTURE_CLIENT_EMAIL: &str = "svc@proj.iam.gserviceaccount.com";
	/// Subject impersonated by fixture requests.
	pub const FIXTURE_SUBJECT: &str = "user@domain.com";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		test_reqwest_http_client_with_timeout(DEFAULT_TIMEOUT)
	}

	/// Same as [`test_reqwest_http_client`] with a custom request timeout.
	pub fn test_reqwest_http_client_with_timeout(timeout: StdDuration) -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.timeout(timeout)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Service account key JSON in the shape downloaded from the identity platform.
	pub fn fixture_key_json() -> serde_json::Value {
		serde_json::json!({
			"type": "service_account",
			"project_id": "proj",
			"private_key_id": "0123456789abcdef",
			"private_key": FIXTURE_PKCS8_PEM,
			"client_email": FIXTURE_CLIENT_EMAIL,
			"client_id": "123456789012345678901",
			"token_uri": "https://oauth2.googleapis.com/token",
		})
	}

	/// Descriptor pointing at a mock token endpoint.
	pub fn test_descriptor(token_endpoint: &str) -> ProviderDescriptor {
		ProviderDescriptor::builder()
			.token_endpoint(Url::parse(token_endpoint).expect("Mock token endpoint should parse."))
			.build()
			.expect("Mock descriptor should build.")
	}

	/// Constructs a [`Broker`] using the insecure reqwest transport used across integration
	/// tests.
	pub fn build_reqwest_test_broker(descriptor: ProviderDescriptor) -> ReqwestBroker {
		Broker::with_http_client(descriptor, test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;

use color_eyre as _;
#[cfg(test)] use {httpmock as _, oauth2_impersonator as _, tower as _};
