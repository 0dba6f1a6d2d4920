//! Optional observability helpers for token lookups, dispatched calls, and response mapping.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `trade_master_api.call` with the `call`
//!   (operation kind) and `stage` (call site) fields, plus `status` once the gateway answers.
//! - Enable `metrics` to increment the `trade_master_api_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Cached-token lookup, including any refresh it triggers.
	TokenLookup,
	/// Client-credentials exchange against the token endpoint.
	TokenIssue,
	/// Request dispatched to a Trade Master resource.
	Dispatch,
	/// Structural mapping of a response payload.
	Mapping,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::TokenLookup => "token_lookup",
			CallKind::TokenIssue => "token_issue",
			CallKind::Dispatch => "dispatch",
			CallKind::Mapping => "mapping",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Served from the credential cache without contacting the issuer.
	CacheHit,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::CacheHit => "cache_hit",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the terminal outcome of `result` for `kind`.
pub(crate) fn record_result<T>(kind: CallKind, result: &Result<T>) {
	match result {
		Ok(_) => record_call_outcome(kind, CallOutcome::Success),
		Err(_) => record_call_outcome(kind, CallOutcome::Failure),
	}
}
