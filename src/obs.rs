//! Optional observability helpers for the issuance flow.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `oauth2_impersonator.flow` with
//!   the `flow`, `call`, and `subject` fields, plus `warn` events naming the stage and error kind
//!   of every failure. Key material, assertions, and access tokens are never recorded.
//! - Enable `metrics` to increment the `oauth2_impersonator_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome` (+ `stage` and `error` on
//!   failures).

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Label used for the only grant this crate performs.
pub const FLOW_LABEL: &str = "jwt_bearer";

/// Steps of the issuance flow, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// Checking the caller's request before any key material is touched.
	ValidateRequest,
	/// Parsing and loading the service account key.
	LoadKey,
	/// Building and signing the assertion.
	BuildAssertion,
	/// Exchanging the assertion at the token endpoint.
	ExchangeToken,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::ValidateRequest => "validate_request",
			FlowStage::LoadKey => "load_key",
			FlowStage::BuildAssertion => "build_assertion",
			FlowStage::ExchangeToken => "exchange_token",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to the flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
