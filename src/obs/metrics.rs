// self
use crate::obs::{CacheOp, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_cache_op(op: CacheOp, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"scoped_token_cache_op_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}
