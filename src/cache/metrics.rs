// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing how requests were served.
#[derive(Debug, Default)]
pub struct CacheMetrics {
	hits: AtomicU64,
	refreshes: AtomicU64,
	refresh_failures: AtomicU64,
	waits: AtomicU64,
	initializations: AtomicU64,
	initialization_failures: AtomicU64,
}
impl CacheMetrics {
	/// Requests answered from a fresh cached token.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Token acquisitions started by an elected refresher.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Token acquisitions that failed, panicked, or returned an empty token.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failures.load(Ordering::Relaxed)
	}

	/// Times a caller parked behind another caller's refresh.
	pub fn waits(&self) -> u64 {
		self.waits.load(Ordering::Relaxed)
	}

	/// Credential `init` calls made by the cache.
	pub fn initializations(&self) -> u64 {
		self.initializations.load(Ordering::Relaxed)
	}

	/// Credential `init` calls that failed.
	pub fn initialization_failures(&self) -> u64 {
		self.initialization_failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_wait(&self) {
		self.waits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_initialization(&self) {
		self.initializations.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_initialization_failure(&self) {
		self.initialization_failures.fetch_add(1, Ordering::Relaxed);
	}
}
