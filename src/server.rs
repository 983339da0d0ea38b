//! HTTP surface: `POST /get-token` plus permissive CORS.
//!
//! Request bodies are parsed by hand rather than through axum's `Json` extractor so every
//! malformed input maps to the same `400 {"error": ...}` shape. Error variants are turned into
//! status codes here and nowhere else.

// std
use std::io;
// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{Request, State},
	http::{
		HeaderValue, Method, StatusCode,
		header::{
			ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
			ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS,
		},
	},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::post,
};
use serde_json::{Map, Value};
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	assertion::{DEFAULT_EXPIRY_SECS, ImpersonationRequest},
	broker::Broker,
	http::TokenHttpClient,
};

/// Path of the token issuance endpoint.
pub const TOKEN_PATH: &str = "/get-token";

const PREFLIGHT_MAX_AGE_SECS: &str = "600";

/// Parsed body of a `POST /get-token` call.
#[derive(Clone)]
pub struct TokenRequestBody {
	/// Service account key, as supplied by the caller.
	pub service_account_json: Value,
	/// Impersonation parameters.
	pub request: ImpersonationRequest,
}
impl TokenRequestBody {
	/// Parses and checks a raw JSON body.
	///
	/// Every failure is an [`Error::InvalidRequest`]; the key itself is not inspected.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		let value: Value = serde_json::from_slice(bytes)
			.map_err(|e| Error::invalid_request(format!("body is not valid JSON: {e}")))?;
		let Value::Object(mut fields) = value else {
			return Err(Error::invalid_request("body must be a JSON object"));
		};
		let service_account_json = match fields.remove("service_account_json") {
			Some(Value::Null) | None =>
				return Err(Error::invalid_request("`service_account_json` is required")),
			Some(key) => key,
		};
		let issuer = required_string(&mut fields, "iss")?;
		let subject = required_string(&mut fields, "sub")?;
		let expiry_duration = match fields.remove("exp_duration") {
			Some(Value::Null) | None => DEFAULT_EXPIRY_SECS,
			Some(value) => value.as_i64().ok_or_else(|| {
				Error::invalid_request(format!("`exp_duration` must be an integer, got {value}"))
			})?,
		};
		let request =
			ImpersonationRequest::new(issuer, subject).with_expiry_duration(expiry_duration);

		request.validate()?;

		Ok(Self { service_account_json, request })
	}
}
impl Debug for TokenRequestBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRequestBody")
			.field("service_account_json", &"<redacted>")
			.field("request", &self.request)
			.finish()
	}
}

/// Builds the application router around a shared broker.
pub fn router<C>(broker: Arc<Broker<C>>) -> Router
where
	C: ?Sized + TokenHttpClient,
{
	Router::new()
		.route(TOKEN_PATH, post(get_token::<C>))
		.layer(middleware::from_fn(cors))
		.with_state(broker)
}

/// Serves `router` on `listener` until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, router: Router) -> io::Result<()> {
	#[cfg(feature = "tracing")]
	if let Ok(addr) = listener.local_addr() {
		tracing::info!(%addr, "listening");
	}

	axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await
}

/// Status code a failed request is answered with.
pub fn status_for(error: &Error) -> StatusCode {
	match error {
		Error::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
		Error::AuthorizationServer { status, .. } => StatusCode::from_u16(*status)
			.ok()
			.filter(|status| status.as_u16() >= 200)
			.unwrap_or(StatusCode::BAD_GATEWAY),
		Error::MissingField { .. }
		| Error::MalformedKey { .. }
		| Error::SigningFailure { .. }
		| Error::TokenResponseParse { .. }
		| Error::Transport(_)
		| Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = status_for(&self);
		let message = match self {
			Error::AuthorizationServer { body, .. } => body,
			other => other.to_string(),
		};

		(status, Json(serde_json::json!({ "error": message }))).into_response()
	}
}

async fn get_token<C>(State(broker): State<Arc<Broker<C>>>, body: Bytes) -> Response
where
	C: ?Sized + TokenHttpClient,
{
	let result = match TokenRequestBody::parse(&body) {
		Ok(TokenRequestBody { service_account_json, request }) =>
			broker.issue_token(&service_account_json, request).await,
		Err(e) => Err(e),
	};

	match result {
		Ok(token) =>
			Json(serde_json::json!({ "access_token": token.access_token.expose() })).into_response(),
		Err(e) => {
			#[cfg(feature = "tracing")]
			tracing::info!(status = status_for(&e).as_u16(), error = e.kind(), "token request failed");

			e.into_response()
		},
	}
}

async fn cors(request: Request, next: Next) -> Response {
	if request.method() == Method::OPTIONS {
		let allow_headers = request
			.headers()
			.get(ACCESS_CONTROL_REQUEST_HEADERS)
			.cloned()
			.unwrap_or_else(|| HeaderValue::from_static("Content-Type"));
		let mut response = StatusCode::NO_CONTENT.into_response();
		let headers = response.headers_mut();

		headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
		headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS"));
		headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
		headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECS));

		return response;
	}

	let mut response = next.run(request).await;

	response.headers_mut().insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

	response
}

fn required_string(fields: &mut Map<String, Value>, name: &str) -> Result<String> {
	match fields.remove(name) {
		Some(Value::String(value)) => Ok(value),
		Some(Value::Null) | None => Err(Error::invalid_request(format!("`{name}` is required"))),
		Some(other) =>
			Err(Error::invalid_request(format!("`{name}` must be a string, got {other}"))),
	}
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(_e) = tokio::signal::ctrl_c().await {
			#[cfg(feature = "tracing")]
			tracing::warn!("failed to listen for Ctrl-C: {_e}");

			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{SignalKind, signal};

		match signal(SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			},
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!("failed to listen for SIGTERM: {_e}");

				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	#[cfg(feature = "tracing")]
	tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::TransportError;

	#[test]
	fn parses_complete_body() {
		let body = TokenRequestBody::parse(
			br#"{"service_account_json":{"client_email":"a"},"iss":"a","sub":"b","exp_duration":60}"#,
		)
		.expect("Complete body should parse.");

		assert_eq!(body.request.issuer, "a");
		assert_eq!(body.request.subject, "b");
		assert_eq!(body.request.expiry_duration, 60);
		assert_eq!(body.service_account_json["client_email"], "a");
		assert!(!format!("{body:?}").contains("client_email"));
	}

	#[test]
	fn exp_duration_defaults_to_one_hour() {
		let body = TokenRequestBody::parse(br#"{"service_account_json":{},"iss":"a","sub":"b"}"#)
			.expect("Body without exp_duration should parse.");

		assert_eq!(body.request.expiry_duration, 3600);
	}

	#[test]
	fn rejects_incomplete_bodies() {
		let cases: [(&[u8], &str); 9] = [
			(b"not json", "not valid JSON"),
			(b"[]", "JSON object"),
			(br#"{"iss":"a","sub":"b"}"#, "`service_account_json`"),
			(br#"{"service_account_json":{},"sub":"b"}"#, "`iss`"),
			(br#"{"service_account_json":{},"iss":"a","sub":""}"#, "`sub`"),
			(br#"{"service_account_json":{},"iss":7,"sub":"b"}"#, "`iss` must be a string"),
			(br#"{"service_account_json":{},"iss":"a","sub":"b","exp_duration":"60"}"#, "integer"),
			(br#"{"service_account_json":{},"iss":"a","sub":"b","exp_duration":1.5}"#, "integer"),
			(br#"{"service_account_json":{},"iss":"a","sub":"b","exp_duration":0}"#, "positive"),
		];

		for (body, needle) in cases {
			let err = TokenRequestBody::parse(body).expect_err("Body should be rejected.");

			assert!(matches!(err, Error::InvalidRequest { .. }));
			assert!(err.to_string().contains(needle), "{err} should mention {needle}.");
		}
	}

	#[test]
	fn statuses_follow_error_variants() {
		assert_eq!(status_for(&Error::invalid_request("x")), StatusCode::BAD_REQUEST);
		assert_eq!(
			status_for(&Error::MissingField { field: "private_key" }),
			StatusCode::INTERNAL_SERVER_ERROR
		);
		assert_eq!(status_for(&Error::malformed_key("x")), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(
			status_for(&Error::signing_failure(io::Error::other("rsa"))),
			StatusCode::INTERNAL_SERVER_ERROR
		);

		let mut de = serde_json::Deserializer::from_str("{}");
		let parsed: Result<crate::exchange::IssuedToken, _> =
			serde_path_to_error::deserialize(&mut de);
		let source = parsed.expect_err("Empty object lacks access_token.");

		assert_eq!(
			status_for(&Error::TokenResponseParse { source, status: 200 }),
			StatusCode::INTERNAL_SERVER_ERROR
		);

		let transport = ReqwestClient::new()
			.get("http://[::1")
			.build()
			.expect_err("Unterminated IPv6 host should not build a request.");

		assert_eq!(
			status_for(&Error::from(TransportError::from(transport))),
			StatusCode::INTERNAL_SERVER_ERROR
		);
		assert_eq!(
			status_for(&Error::AuthorizationServer { status: 401, body: String::new() }),
			StatusCode::UNAUTHORIZED
		);
		assert_eq!(
			status_for(&Error::AuthorizationServer { status: 42, body: String::new() }),
			StatusCode::BAD_GATEWAY
		);
		assert_eq!(
			status_for(&Error::AuthorizationServer { status: 100, body: String::new() }),
			StatusCode::BAD_GATEWAY
		);
	}
}
