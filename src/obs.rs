//! Optional observability helpers for session flows and requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `docapi_client.flow` with the `flow` and
//!   `stage` fields, plus request outcome events.
//! - Enable `metrics` to increment the `docapi_client_flow_total` counter (labeled by `flow` +
//!   `outcome`) and the `docapi_client_request_total` counter (labeled by `outcome`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Authentication flows observed by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Client credentials grant.
	ClientCredentials,
	/// Resource-owner password grant.
	Password,
	/// Anonymous user provisioning.
	Provisioning,
	/// Token fetched from an alternative token source.
	AlternativeSource,
	/// Full re-authentication triggered by a failed request or an explicit login.
	Reauthentication,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::ClientCredentials => "client_credentials",
			FlowKind::Password => "password",
			FlowKind::Provisioning => "provisioning",
			FlowKind::AlternativeSource => "alternative_source",
			FlowKind::Reauthentication => "reauthentication",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
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
