// self
use crate::{obs::DispatchOutcome, request::Resource};

/// Records a dispatch outcome via the global metrics recorder (when enabled).
pub fn record_dispatch_outcome(resource: Resource, outcome: DispatchOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"memberpress_dispatch_total",
			"resource" => resource.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (resource, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_dispatch_outcome_noop_without_recorder() {
		record_dispatch_outcome(Resource::Members, DispatchOutcome::CacheHit);
	}
}
