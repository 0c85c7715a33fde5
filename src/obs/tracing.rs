// self
use crate::{
	_prelude::*,
	auth::AuthRequirement,
	authority::UnavailableReason,
	http::HttpMethod,
	obs::FlowKind,
};

/// Maximum number of body characters included in failure events.
pub const BODY_PREVIEW_LIMIT: usize = 256;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by session flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("docapi_client.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

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

/// Emits a `debug` event for a request that completed successfully.
pub fn log_request_success(method: HttpMethod, url: &Url, status: u16) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(method = method.as_str(), url = url.as_str(), status, "Request succeeded.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (method, url, status);
	}
}

/// Emits a `warn` event for a failed request, with a truncated body preview.
pub fn log_request_failure(
	method: HttpMethod,
	url: &Url,
	status: Option<u16>,
	body: &[u8],
	error: &'static str,
) {
	#[cfg(feature = "tracing")]
	{
		let preview = body_preview(body);

		tracing::warn!(
			method = method.as_str(),
			url = url.as_str(),
			status,
			error,
			body = %preview,
			"Request failed."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (method, url, status, body, error);
	}
}

/// Emits a `warn` event when a bearer requirement has no usable stored token.
pub fn log_unresolved_credential(requirement: AuthRequirement, reason: UnavailableReason) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			requirement = requirement.as_str(),
			reason = reason.as_str(),
			"No usable credential is stored; re-authenticating."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (requirement, reason);
	}
}

/// Emits a `warn` event when re-authentication failed and the call ends unauthorized.
pub fn log_recovery_failure(requirement: AuthRequirement, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			requirement = requirement.as_str(),
			error = error.label(),
			detail = %error,
			"Re-authentication failed."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (requirement, error);
	}
}

/// Lossy UTF-8 preview of `body`, cut at [`BODY_PREVIEW_LIMIT`] characters.
pub fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let mut chars = text.chars();
	let mut preview = chars.by_ref().take(BODY_PREVIEW_LIMIT).collect::<String>();

	if chars.next().is_some() {
		preview.push('…');
	}

	preview
}
