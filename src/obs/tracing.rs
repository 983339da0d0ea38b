// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by the issuance flow.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span for the JWT-bearer flow tagged with the entry point (`call`).
	///
	/// `subject` is the impersonated user; it identifies the request without exposing
	/// credentials. Per-stage failures are reported as events, not as span fields.
	pub fn new(call: &'static str, subject: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_impersonator.flow",
				flow = crate::obs::FLOW_LABEL,
				call,
				subject
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (call, subject);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Installs the process-wide `fmt` subscriber filtered by `filter` (`RUST_LOG` syntax).
///
/// A no-op when the `tracing` feature is disabled.
pub fn install_subscriber(filter: &str) -> Result<(), Box<dyn StdError + Send + Sync>> {
	#[cfg(feature = "tracing")]
	{
		let filter = tracing_subscriber::EnvFilter::try_new(filter)?;

		tracing_subscriber::fmt().with_env_filter(filter).try_init()
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = filter;

		Ok(())
	}
}
