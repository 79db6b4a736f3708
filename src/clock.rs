//! Time sources used for token freshness checks.

// std
use std::sync::atomic::{AtomicI64, Ordering};
// self
use crate::_prelude::*;

/// Source of the current instant.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current UTC instant.
	fn now(&self) -> OffsetDateTime;
}

/// Wall clock backed by [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Clock that only moves when told to; handy for exercising expiry windows.
#[derive(Debug)]
pub struct ManualClock {
	base: OffsetDateTime,
	offset_ms: AtomicI64,
}
impl ManualClock {
	/// Creates a clock frozen at `start`.
	pub fn new(start: OffsetDateTime) -> Self {
		Self { base: start, offset_ms: AtomicI64::new(0) }
	}

	/// Moves the clock forward (or backward, for negative durations).
	pub fn advance(&self, by: Duration) {
		let delta = i64::try_from(by.whole_milliseconds()).unwrap_or(i64::MAX);

		self.offset_ms.fetch_add(delta, Ordering::SeqCst);
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		self.base + Duration::milliseconds(self.offset_ms.load(Ordering::SeqCst))
	}
}
