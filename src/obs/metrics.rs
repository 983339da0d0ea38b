// self
#[cfg(any(feature = "metrics", feature = "tracing"))] use crate::obs::FLOW_LABEL;
use crate::{
	_prelude::*,
	obs::{FlowOutcome, FlowStage},
};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_impersonator_flow_total",
			"flow" => FLOW_LABEL,
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records which stage failed and why, then logs it (when enabled).
pub fn record_stage_failure(stage: FlowStage, error: &Error) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_impersonator_stage_failure_total",
			"flow" => FLOW_LABEL,
			"stage" => stage.as_str(),
			"error" => error.kind()
		)
		.increment(1);
	}

	#[cfg(feature = "tracing")]
	{
		tracing::warn!(flow = FLOW_LABEL, stage = stage.as_str(), error = error.kind(), "{error}");
	}

	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	{
		let _ = (stage, error);
	}
}
