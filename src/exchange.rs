//! JWT-bearer grant exchange against the authorization server's token endpoint.
//!
//! One POST per call, no retries, no caching: a 200 yields an [`IssuedToken`], every other
//! status is relayed verbatim as [`Error::AuthorizationServer`], and failures to reach the
//! endpoint surface as [`Error::Transport`].

// self
use crate::{
	_prelude::*,
	assertion::Assertion,
	auth::TokenSecret,
	http::{HttpReply, TokenHttpClient},
	provider::ProviderDescriptor,
};

/// RFC 7523 grant type for JWT bearer assertions.
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const STATUS_OK: u16 = 200;

/// Successful token endpoint response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct IssuedToken {
	/// Access token acting as the impersonated subject.
	pub access_token: TokenSecret,
	/// Token type reported by the server (usually `Bearer`).
	#[serde(default)]
	pub token_type: Option<String>,
	/// Lifetime reported by the server, in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
}

/// Posts signed assertions to a single token endpoint.
pub struct TokenExchanger<C>
where
	C: ?Sized + TokenHttpClient,
{
	http_client: Arc<C>,
	token_endpoint: Url,
}
impl<C> TokenExchanger<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates an exchanger for the descriptor's token endpoint.
	pub fn new(http_client: impl Into<Arc<C>>, descriptor: &ProviderDescriptor) -> Self {
		Self { http_client: http_client.into(), token_endpoint: descriptor.token_endpoint.clone() }
	}

	/// Exchanges `assertion` for an access token with a single request.
	pub async fn exchange(&self, assertion: &Assertion) -> Result<IssuedToken> {
		let form = [("grant_type", JWT_BEARER_GRANT_TYPE), ("assertion", assertion.expose())];
		let reply = self.http_client.post_form(&self.token_endpoint, &form).await?;

		map_reply(reply)
	}
}
impl<C> Clone for TokenExchanger<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: self.http_client.clone(), token_endpoint: self.token_endpoint.clone() }
	}
}
impl<C> Debug for TokenExchanger<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchanger").field("token_endpoint", &self.token_endpoint).finish()
	}
}

fn map_reply(reply: HttpReply) -> Result<IssuedToken> {
	let HttpReply { status, body } = reply;

	if status != STATUS_OK {
		return Err(Error::AuthorizationServer { status, body });
	}

	let mut de = serde_json::Deserializer::from_str(&body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| Error::TokenResponseParse { source, status })
}
