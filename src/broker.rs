//! Request-scoped orchestration of the JWT-bearer flow.
//!
//! [`Broker`] owns everything that is shared between requests (the HTTP client, the provider
//! descriptor, the assertion builder) and nothing that is specific to one. Each call to
//! [`Broker::issue_token`] validates the request, loads the caller's key, signs an assertion
//! and exchanges it, in that order, stopping at the first failure.

// self
use crate::{
	_prelude::*,
	assertion::{AssertionBuilder, ImpersonationRequest},
	auth::ServiceAccountKey,
	exchange::{IssuedToken, TokenExchanger},
	http::{ReqwestHttpClient, TokenHttpClient},
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::ProviderDescriptor,
};

/// Broker specialized for the crate's default reqwest transport.
pub type ReqwestBroker = Broker<ReqwestHttpClient>;

/// Issues impersonated access tokens against a single authorization server.
///
/// A broker is immutable once built and safe to share across tasks behind an [`Arc`].
pub struct Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	descriptor: ProviderDescriptor,
	assertions: AssertionBuilder,
	exchanger: TokenExchanger<C>,
}
impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(descriptor: ProviderDescriptor, http_client: impl Into<Arc<C>>) -> Self {
		let assertions = AssertionBuilder::from_descriptor(&descriptor);
		let exchanger = TokenExchanger::new(http_client, &descriptor);

		Self { descriptor, assertions, exchanger }
	}

	/// Runs the full flow for a key supplied as raw JSON.
	///
	/// The request is validated before the key is parsed, so a malformed request is reported
	/// as [`Error::InvalidRequest`] even when the key is unusable too.
	pub async fn issue_token(
		&self,
		key_json: &serde_json::Value,
		request: ImpersonationRequest,
	) -> Result<IssuedToken> {
		let span = FlowSpan::new("issue_token", &request.subject);

		obs::record_flow_outcome(FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				staged(FlowStage::ValidateRequest, request.validate())?;

				let key = staged(FlowStage::LoadKey, ServiceAccountKey::from_value(key_json))?;

				self.run(&key, &request).await
			})
			.await;

		record_outcome(&result);

		result
	}

	/// Runs the flow for an already-parsed key.
	pub async fn issue_token_with_key(
		&self,
		key: &ServiceAccountKey,
		request: ImpersonationRequest,
	) -> Result<IssuedToken> {
		let span = FlowSpan::new("issue_token_with_key", &request.subject);

		obs::record_flow_outcome(FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				staged(FlowStage::ValidateRequest, request.validate())?;

				self.run(key, &request).await
			})
			.await;

		record_outcome(&result);

		result
	}

	async fn run(&self, key: &ServiceAccountKey, request: &ImpersonationRequest) -> Result<IssuedToken> {
		let identity = staged(FlowStage::LoadKey, key.load())?;
		let assertion =
			staged(FlowStage::BuildAssertion, self.assertions.build(request, &identity))?;

		#[cfg(feature = "tracing")]
		tracing::debug!(
			issuer = identity.client_email(),
			key_id = identity.key_id(),
			lifetime_secs = assertion.claims().lifetime().whole_seconds(),
			"assertion signed"
		);

		let exchanged = self.exchanger.exchange(&assertion).await;

		#[cfg(feature = "tracing")]
		if let Err(Error::AuthorizationServer { status, .. }) = &exchanged {
			tracing::warn!(
				issuer = identity.client_email(),
				status = *status,
				"token endpoint rejected the assertion"
			);
		}

		let token = staged(FlowStage::ExchangeToken, exchanged)?;

		#[cfg(feature = "tracing")]
		tracing::debug!(
			issuer = identity.client_email(),
			expires_in = token.expires_in,
			"access token issued"
		);

		Ok(token)
	}
}
impl<C> Clone for Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			descriptor: self.descriptor.clone(),
			assertions: self.assertions.clone(),
			exchanger: self.exchanger.clone(),
		}
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker").field("descriptor", &self.descriptor).finish()
	}
}

fn staged<T>(stage: FlowStage, result: Result<T>) -> Result<T> {
	if let Err(e) = &result {
		obs::record_stage_failure(stage, e);
	}

	result
}

fn record_outcome<T>(result: &Result<T>) {
	let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

	obs::record_flow_outcome(outcome);
}
