//! Command-line configuration for the `oauth2-impersonator` binary.
//!
//! All startup configuration comes from flags; per-request inputs come from the HTTP body.

// std
use std::{net::SocketAddr, time::Duration as StdDuration};
// crates.io
use clap::Parser;
// self
use crate::{
	_prelude::*,
	broker::{Broker, ReqwestBroker},
	error::ConfigError,
	http::ReqwestHttpClient,
	provider::{GOOGLE_TOKEN_ENDPOINT, ProviderDescriptor},
};

/// Startup flags.
#[derive(Clone, Debug, Parser)]
#[command(name = "oauth2-impersonator", version)]
#[command(about = "Exchange caller-supplied service account keys for impersonated access tokens")]
pub struct Cli {
	/// Address the HTTP server binds to.
	#[arg(long, default_value = "127.0.0.1:5000")]
	pub listen: SocketAddr,

	/// Token endpoint assertions are posted to; also their audience.
	#[arg(long, default_value = GOOGLE_TOKEN_ENDPOINT)]
	pub token_endpoint: Url,

	/// Seconds to wait for the token endpoint before failing the request.
	#[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
	pub upstream_timeout_secs: u64,

	/// Seconds to backdate `iat` by, for authorization servers with slow clocks.
	#[arg(long, default_value_t = 0)]
	pub clock_skew_secs: u32,

	/// Log filter, in `RUST_LOG` syntax.
	#[arg(long, default_value = "info")]
	pub log: String,
}
impl Cli {
	/// Provider descriptor described by the flags.
	pub fn descriptor(&self) -> Result<ProviderDescriptor, ConfigError> {
		let descriptor = ProviderDescriptor::builder()
			.token_endpoint(self.token_endpoint.clone())
			.clock_skew(Duration::seconds(self.clock_skew_secs.into()))
			.build()?;

		Ok(descriptor)
	}

	/// Reqwest transport honoring `--upstream-timeout-secs`.
	pub fn http_client(&self) -> Result<ReqwestHttpClient, ConfigError> {
		ReqwestHttpClient::with_timeout(StdDuration::from_secs(self.upstream_timeout_secs))
	}

	/// Broker wired from [`descriptor`](Self::descriptor) and [`http_client`](Self::http_client).
	pub fn broker(&self) -> Result<ReqwestBroker, ConfigError> {
		Ok(Broker::with_http_client(self.descriptor()?, self.http_client()?))
	}
}
