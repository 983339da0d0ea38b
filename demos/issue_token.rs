//! Issues an impersonated access token against a local stub authorization server, using the
//! reqwest transport and a service account key supplied as JSON.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_impersonator::{
	assertion::ImpersonationRequest,
	broker::ReqwestBroker,
	http::ReqwestHttpClient,
	provider::ProviderDescriptor,
	reqwest::Client,
};

const PRIVATE_KEY: &str = include_str!("../tests/fixtures/service_account_pkcs8.pem");
const CLIENT_EMAIL: &str = "svc@proj.iam.gserviceaccount.com";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"ya29.demo\",\"token_type\":\"Bearer\",\"expires_in\":3599}",
			);
		})
		.await;
	let descriptor =
		ProviderDescriptor::builder().token_endpoint(Url::parse(&server.url("/token"))?).build()?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let broker = ReqwestBroker::with_http_client(descriptor, http_client);
	let key = serde_json::json!({
		"type": "service_account",
		"private_key": PRIVATE_KEY,
		"client_email": CLIENT_EMAIL,
	});
	let request =
		ImpersonationRequest::new(CLIENT_EMAIL, "user@domain.com").with_expiry_duration(600);
	let token = broker.issue_token(&key, request).await?;

	println!(
		"issued token `{}` (type {:?}, expires in {:?}s)",
		token.access_token.expose(),
		token.token_type,
		token.expires_in
	);

	token_mock.assert_calls_async(1).await;

	Ok(())
}
