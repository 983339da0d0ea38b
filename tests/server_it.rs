// crates.io
use axum::{
	Router,
	body::{Body, to_bytes},
	http::{Method, Request, StatusCode, header},
	response::Response,
};
use httpmock::prelude::*;
use serde_json::Value;
use tower::ServiceExt;
// self
use oauth2_impersonator::{_preludet::*, server};

const EC_PEM: &str = include_str!("fixtures/ec_p256.pem");

fn app(token_endpoint: &str) -> Router {
	server::router(Arc::new(build_reqwest_test_broker(test_descriptor(token_endpoint))))
}

fn body(service_account_json: Value) -> Value {
	serde_json::json!({
		"service_account_json": service_account_json,
		"iss": FIXTURE_CLIENT_EMAIL,
		"sub": FIXTURE_SUBJECT,
		"exp_duration": 3600,
	})
}

async fn post(app: Router, body: &Value) -> Response {
	let request = Request::builder()
		.method(Method::POST)
		.uri(server::TOKEN_PATH)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.expect("Request should build.");

	app.oneshot(request).await.expect("Router should not fail.")
}

async fn json(response: Response) -> Value {
	let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("Body should be readable.");

	serde_json::from_slice(&bytes).expect("Body should be JSON.")
}

async fn mock_token<'a>(
	server: &'a MockServer,
	status: u16,
	body: &'static str,
) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(status).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn issues_access_token() {
	let server = MockServer::start_async().await;
	let mock = mock_token(
		&server,
		200,
		"{\"access_token\":\"ya29.fake\",\"expires_in\":3599,\"token_type\":\"Bearer\"}",
	)
	.await;
	let response = post(app(&server.url("/token")), &body(fixture_key_json())).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).map(|v| v.as_bytes()),
		Some(&b"*"[..])
	);
	assert_eq!(json(response).await, serde_json::json!({ "access_token": "ya29.fake" }));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn forwards_upstream_rejection() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, 400, "{\"error\": \"invalid_grant\"}").await;
	let response = post(app(&server.url("/token")), &body(fixture_key_json())).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json(response).await, serde_json::json!({ "error": "{\"error\": \"invalid_grant\"}" }));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn ok_without_access_token_is_an_internal_error() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, 200, "{}").await;
	let response = post(app(&server.url("/token")), &body(fixture_key_json())).await;

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert!(
		json(response).await["error"].as_str().is_some_and(|e| e.contains("access_token")),
		"Error should name the missing field."
	);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn missing_identities_are_rejected_locally() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, 200, "{\"access_token\":\"ya29.fake\"}").await;

	for field in ["iss", "sub"] {
		let mut body = body(fixture_key_json());

		body.as_object_mut().expect("Body should be an object.").remove(field);

		let response = post(app(&server.url("/token")), &body).await;

		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let error = json(response).await;

		assert!(error["error"].as_str().is_some_and(|e| e.contains(field)), "{error}");
	}

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn unusable_requests_never_reach_upstream() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, 200, "{\"access_token\":\"ya29.fake\"}").await;
	let mut missing_key = body(fixture_key_json());

	missing_key.as_object_mut().expect("Body should be an object.").remove("service_account_json");

	let mut mismatched = body(fixture_key_json());

	mismatched["iss"] = Value::from("other@proj.iam.gserviceaccount.com");

	let mut zero_expiry = body(fixture_key_json());

	zero_expiry["exp_duration"] = Value::from(0);

	for request in [missing_key, mismatched, zero_expiry] {
		let response = post(app(&server.url("/token")), &request).await;

		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	let mut key = fixture_key_json();

	key.as_object_mut().expect("Key should be an object.").remove("private_key");

	let response = post(app(&server.url("/token")), &body(key)).await;

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert!(json(response).await["error"].as_str().is_some_and(|e| e.contains("private_key")));

	let mut key = fixture_key_json();

	key["private_key"] = Value::from(EC_PEM);

	let response = post(app(&server.url("/token")), &body(key)).await;

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn unparseable_body_is_rejected() {
	let request = Request::builder()
		.method(Method::POST)
		.uri(server::TOKEN_PATH)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from("{not json"))
		.expect("Request should build.");
	let response = app("https://127.0.0.1:1/token")
		.oneshot(request)
		.await
		.expect("Router should not fail.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert!(json(response).await["error"].is_string());
}

#[tokio::test]
async fn network_failure_is_an_internal_error() {
	let response = post(app("https://127.0.0.1:1/token"), &body(fixture_key_json())).await;

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert!(
		json(response).await["error"].as_str().is_some_and(|e| e.starts_with("Network error"))
	);
}

#[tokio::test]
async fn answers_cors_preflight() {
	let request = Request::builder()
		.method(Method::OPTIONS)
		.uri(server::TOKEN_PATH)
		.header(header::ORIGIN, "https://admin.example.com")
		.header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
		.header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
		.body(Body::empty())
		.expect("Request should build.");
	let response = app("https://127.0.0.1:1/token")
		.oneshot(request)
		.await
		.expect("Router should not fail.");
	let headers = response.headers();

	assert_eq!(response.status(), StatusCode::NO_CONTENT);
	assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).map(|v| v.as_bytes()), Some(&b"*"[..]));
	assert_eq!(
		headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).map(|v| v.as_bytes()),
		Some(&b"content-type"[..])
	);
	assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}
