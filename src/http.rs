//! Transport primitives for token exchanges.
//!
//! The module exposes [`TokenHttpClient`], the impersonator's only dependency on an HTTP
//! stack, together with the reqwest-backed [`ReqwestHttpClient`]. Downstream crates (and the
//! integration tests) can swap in their own transport without touching the flow.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, error::ConfigError, error::TransportError};

/// Default bound on a single token request.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Boxed future returned by [`TokenHttpClient::post_form`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpReply, TransportError>> + 'a + Send>>;

/// Status and raw body of a token endpoint response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Response body decoded as text.
	pub body: String,
}

/// Abstraction over HTTP transports capable of posting a form to the token endpoint.
///
/// Implementations must be `Send + Sync + 'static` so a single instance can be shared by
/// every concurrent request. They must make exactly one attempt per call and report any
/// HTTP response, successful or not, as `Ok`; only failures to obtain a response at all are
/// [`TransportError`]s.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `form` as an `application/x-www-form-urlencoded` POST to `url`.
	fn post_form<'a>(&'a self, url: &'a Url, form: &'a [(&'a str, &'a str)]) -> HttpFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI. Configure any
/// custom [`ReqwestClient`] passed to [`with_client`](Self::with_client) the same way.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that gives up on the token endpoint after `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.timeout(timeout)
			.https_only(true)
			.build()?;

		Ok(Self(client))
	}
}
impl TokenHttpClient for ReqwestHttpClient {
	fn post_form<'a>(&'a self, url: &'a Url, form: &'a [(&'a str, &'a str)]) -> HttpFuture<'a> {
		Box::pin(async move {
			let response = self.0.post(url.clone()).form(form).send().await?;
			let status = response.status().as_u16();
			let body = response.text().await?;

			Ok::<_, TransportError>(HttpReply { status, body })
		})
	}
}
