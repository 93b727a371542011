//! Optional observability helpers for dispatches.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run every dispatch inside a `memberpress.dispatch` span carrying the
//!   `resource`, `method`, and `path` fields, and to let [`LogObserver`] emit debug events.
//! - Enable `metrics` to increment the `memberpress_dispatch_total` counter for every
//!   attempt, cache hit, success, and failure, labeled by `resource` + `outcome`.
//!
//! Without either feature the helpers compile to no-ops.

mod metrics;
mod observer;
mod tracing;

pub use metrics::*;
pub use observer::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
	/// Entry to the dispatcher.
	Attempt,
	/// Answered from the response cache without a network call.
	CacheHit,
	/// Successful completion over the network.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl DispatchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			DispatchOutcome::Attempt => "attempt",
			DispatchOutcome::CacheHit => "cache_hit",
			DispatchOutcome::Success => "success",
			DispatchOutcome::Failure => "failure",
		}
	}
}
impl Display for DispatchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
