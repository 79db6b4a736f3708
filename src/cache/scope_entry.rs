//! Token slot for one credential/scope-set pair with single-flight refresh coordination.
//!
//! Each entry guards its state with a short-lived lock and parks contenders on a
//! [`Notify`]. A caller that finds no fresh token and no refresh in flight claims the refresh
//! under the lock, then calls the credential with the lock released. Everyone else waits for
//! the refresher's broadcast and re-evaluates the state from scratch, so a failed refresh simply
//! hands the role to the next caller.

// std
use std::panic::AssertUnwindSafe;
// crates.io
use futures::FutureExt;
use tokio::sync::{Notify, futures::Notified};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeKey},
	cache::Shared,
	credential::TokenCredential,
	error::CredentialError,
	obs::{self, CacheOp, OpOutcome, debug_event},
};

#[derive(Debug, Default)]
struct ScopeState {
	token: Option<AccessToken>,
	refreshing: bool,
}

/// What a caller should do after inspecting the entry under its lock.
enum Claim<'a> {
	Cached(AccessToken),
	Refresh,
	Wait(Notified<'a>),
}

pub(crate) struct ScopeEntry {
	key: ScopeKey,
	scopes: Vec<String>,
	state: Mutex<ScopeState>,
	refreshed: Notify,
}
impl ScopeEntry {
	pub(crate) fn new<S>(key: ScopeKey, scopes: &[S]) -> Self
	where
		S: AsRef<str>,
	{
		Self {
			key,
			scopes: scopes.iter().map(|scope| scope.as_ref().to_owned()).collect(),
			state: Mutex::default(),
			refreshed: Notify::new(),
		}
	}

	/// Last token stored by a successful refresh, fresh or not.
	pub(crate) fn cached(&self) -> Option<AccessToken> {
		self.state.lock().token.clone()
	}

	/// Returns a fresh token, refreshing through `credential` when this caller wins the claim.
	pub(crate) async fn access_token(
		&self,
		credential: &dyn TokenCredential,
		cancel: &CancellationToken,
		shared: &Shared,
	) -> Result<AccessToken> {
		loop {
			match self.claim(shared) {
				Claim::Cached(token) => {
					shared.metrics.record_hit();
					obs::record_cache_op(CacheOp::GetToken, OpOutcome::Hit);

					return Ok(token);
				},
				Claim::Refresh => return self.refresh(credential, cancel, shared).await,
				Claim::Wait(notified) => {
					shared.metrics.record_wait();

					tokio::select! {
						_ = notified => {},
						_ = cancel.cancelled() => {
							debug_event!(scopes = %self.key, "cancelled while waiting on refresh");

							return Err(Error::Cancelled { stage: "an in-flight token refresh" });
						},
					}
				},
			}
		}
	}

	fn claim(&self, shared: &Shared) -> Claim<'_> {
		let now = shared.clock.now();
		let mut state = self.state.lock();

		if let Some(token) =
			state.token.as_ref().filter(|token| token.is_fresh_at(now, shared.expiry_buffer))
		{
			return Claim::Cached(token.clone());
		}
		if !state.refreshing {
			state.refreshing = true;

			return Claim::Refresh;
		}

		// Must be created before the lock is released or the refresher's broadcast can be missed.
		Claim::Wait(self.refreshed.notified())
	}

	async fn refresh(
		&self,
		credential: &dyn TokenCredential,
		cancel: &CancellationToken,
		shared: &Shared,
	) -> Result<AccessToken> {
		let mut guard = RefreshGuard { entry: self, replacement: None };

		shared.metrics.record_refresh();
		obs::record_cache_op(CacheOp::Refresh, OpOutcome::Attempt);
		debug_event!(scopes = %self.key, "elected to refresh access token");

		// Built inside the async block so a panic while creating the future is caught too.
		let acquired =
			AssertUnwindSafe(async { credential.acquire_token(cancel, &self.scopes).await })
				.catch_unwind()
				.await;
		let outcome = match acquired {
			Ok(Ok(token)) if token.token.is_empty() =>
				Err(Error::EmptyToken { scopes: self.key.to_string() }),
			Ok(Ok(token)) => Ok(token),
			Ok(Err(source)) => Err(Error::Refresh { scopes: self.key.to_string(), source }),
			Err(payload) => Err(Error::Refresh {
				scopes: self.key.to_string(),
				source: CredentialError::from_panic(payload),
			}),
		};

		match outcome {
			Ok(token) => {
				guard.replacement = Some(token.clone());

				obs::record_cache_op(CacheOp::Refresh, OpOutcome::Success);

				Ok(token)
			},
			Err(err) => {
				shared.metrics.record_refresh_failure();
				obs::record_cache_op(CacheOp::Refresh, OpOutcome::Failure);
				debug_event!(scopes = %self.key, error = %err, "token refresh failed");

				Err(err)
			},
		}
	}
}
impl Debug for ScopeEntry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("ScopeEntry")
			.field("key", &self.key)
			.field("token", &state.token)
			.field("refreshing", &state.refreshing)
			.finish()
	}
}

/// Ends a claimed refresh on every exit path: success, error, panic, or the refreshing future
/// being dropped mid-flight.
struct RefreshGuard<'a> {
	entry: &'a ScopeEntry,
	replacement: Option<AccessToken>,
}
impl Drop for RefreshGuard<'_> {
	fn drop(&mut self) {
		{
			let mut state = self.entry.state.lock();

			state.refreshing = false;

			if let Some(token) = self.replacement.take() {
				state.token = Some(token);
			}
		}

		self.entry.refreshed.notify_waiters();
	}
}
