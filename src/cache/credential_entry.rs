//! Per-credential entry: one-time initialization plus the nested scope store.

// std
use std::{
	panic::AssertUnwindSafe,
	sync::atomic::{AtomicBool, Ordering},
};
// crates.io
use dashmap::DashMap;
use futures::FutureExt;
// self
use crate::{
	_prelude::*,
	auth::ScopeKey,
	cache::{Shared, scope_entry::ScopeEntry},
	credential::TokenCredential,
	error::CredentialError,
	obs::{self, CacheOp, OpOutcome, debug_event},
};

pub(crate) struct CredentialEntry {
	key: String,
	credential: Arc<dyn TokenCredential>,
	initialized: AtomicBool,
	init_lock: AsyncMutex<()>,
	scopes: DashMap<ScopeKey, Arc<ScopeEntry>>,
}
impl CredentialEntry {
	pub(crate) fn new(key: String, credential: Arc<dyn TokenCredential>) -> Self {
		Self {
			key,
			credential,
			initialized: AtomicBool::new(false),
			init_lock: AsyncMutex::new(()),
			scopes: DashMap::new(),
		}
	}

	pub(crate) fn credential(&self) -> &dyn TokenCredential {
		self.credential.as_ref()
	}

	pub(crate) fn is_initialized(&self) -> bool {
		self.initialized.load(Ordering::Acquire)
	}

	pub(crate) fn scope_count(&self) -> usize {
		self.scopes.len()
	}

	/// Runs the credential's `init` once, serializing first-time callers on the init lock.
	///
	/// Failures leave the flag unset so the next request retries.
	pub(crate) async fn ensure_initialized(
		&self,
		cancel: &CancellationToken,
		shared: &Shared,
	) -> Result<()> {
		if self.is_initialized() {
			return Ok(());
		}

		let _init = tokio::select! {
			guard = self.init_lock.lock() => guard,
			_ = cancel.cancelled() => {
				return Err(Error::Cancelled { stage: "credential initialization" });
			},
		};

		if self.is_initialized() {
			return Ok(());
		}

		shared.metrics.record_initialization();
		obs::record_cache_op(CacheOp::Initialize, OpOutcome::Attempt);
		debug_event!(credential = %self.key, "initializing credential");

		// Called inside the async block so a panic while creating the future is caught too.
		let initialized =
			AssertUnwindSafe(async { self.credential.init().await }).catch_unwind().await;
		let source = match initialized {
			Ok(Ok(())) => {
				self.initialized.store(true, Ordering::Release);
				obs::record_cache_op(CacheOp::Initialize, OpOutcome::Success);

				return Ok(());
			},
			Ok(Err(source)) => source,
			Err(payload) => CredentialError::from_panic(payload),
		};

		shared.metrics.record_initialization_failure();
		obs::record_cache_op(CacheOp::Initialize, OpOutcome::Failure);
		debug_event!(credential = %self.key, error = %source, "credential initialization failed");

		Err(Error::Initialization { key: self.key.clone(), source })
	}

	/// Returns the entry for `scopes`, creating it on first use.
	pub(crate) fn scope_entry<S>(&self, scopes: &[S]) -> Arc<ScopeEntry>
	where
		S: AsRef<str>,
	{
		let key = ScopeKey::new(scopes);

		if let Some(entry) = self.scopes.get(&key) {
			return entry.value().clone();
		}

		self.scopes
			.entry(key.clone())
			.or_insert_with(|| Arc::new(ScopeEntry::new(key, scopes)))
			.value()
			.clone()
	}

	/// Looks up an existing scope entry without creating one.
	pub(crate) fn existing_scope_entry(&self, key: &ScopeKey) -> Option<Arc<ScopeEntry>> {
		self.scopes.get(key).map(|entry| entry.value().clone())
	}
}
impl Debug for CredentialEntry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialEntry")
			.field("key", &self.key)
			.field("initialized", &self.is_initialized())
			.field("scopes", &self.scopes.len())
			.finish()
	}
}
