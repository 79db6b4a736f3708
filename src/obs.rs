//! Optional observability helpers for cache operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap each cache call in a span named `scoped_token_cache.op` with the
//!   `op`, `stage` and `credential` fields, and to emit `debug` events when refreshes are
//!   elected or fail.
//! - Enable `metrics` to increment the `scoped_token_cache_op_total` counter for every
//!   attempt/hit/success/failure/cancellation, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

pub(crate) use self::tracing::debug_event;

// self
use crate::_prelude::*;

/// Cache operations observed by the instrumentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheOp {
	/// Facade lookup of a token.
	GetToken,
	/// One-time credential initialization.
	Initialize,
	/// Token acquisition performed by the elected refresher.
	Refresh,
}
impl CacheOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheOp::GetToken => "get_token",
			CacheOp::Initialize => "initialize",
			CacheOp::Refresh => "refresh",
		}
	}
}
impl Display for CacheOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a cache operation.
	Attempt,
	/// Served from a fresh cached token.
	Hit,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// The caller's cancellation signal fired while it waited.
	Cancelled,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Hit => "hit",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
			OpOutcome::Cancelled => "cancelled",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
