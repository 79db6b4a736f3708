//! Shared fixtures for cache integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use time::{Duration, OffsetDateTime, macros};
use tokio::sync::Semaphore;
// self
use scoped_token_cache::{
	AccessToken, CancellationToken, CredentialError, TokenCredential,
	clock::{Clock, ManualClock},
	credential::CredentialFuture,
};

pub const START: OffsetDateTime = macros::datetime!(2025-06-01 12:00 UTC);

/// Scripted outcome for one acquisition; unscripted calls mint `T{n}`.
#[derive(Clone, Debug)]
pub enum Step {
	Mint,
	Fail(&'static str),
	Panic,
	/// Panics while building the acquisition future, before anything is polled.
	PanicEager,
	Empty,
}

/// Credential double counting `init`/`acquire_token` calls, with an optional gate that holds
/// acquisitions open until the test releases them.
pub struct MockCredential {
	key: String,
	clock: Arc<dyn Clock>,
	lifetime: Duration,
	init_calls: AtomicUsize,
	failing_inits: AtomicUsize,
	panicking_inits: AtomicUsize,
	init_delay: std::time::Duration,
	acquire_calls: AtomicUsize,
	script: Mutex<VecDeque<Step>>,
	gate: Option<Arc<Semaphore>>,
	gated_scope: Option<String>,
	seen_scopes: Mutex<Vec<Vec<String>>>,
}
impl MockCredential {
	pub fn new(key: &str, clock: Arc<dyn Clock>) -> Self {
		Self {
			key: key.to_owned(),
			clock,
			lifetime: Duration::hours(1),
			init_calls: AtomicUsize::new(0),
			failing_inits: AtomicUsize::new(0),
			panicking_inits: AtomicUsize::new(0),
			init_delay: std::time::Duration::ZERO,
			acquire_calls: AtomicUsize::new(0),
			script: Mutex::new(VecDeque::new()),
			gate: None,
			gated_scope: None,
			seen_scopes: Mutex::new(Vec::new()),
		}
	}

	/// Tokens minted by this credential stay valid for `lifetime` past the clock's now.
	pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
		self.lifetime = lifetime;

		self
	}

	/// Queues outcomes for the next acquisitions, in order.
	pub fn with_script(self, steps: impl IntoIterator<Item = Step>) -> Self {
		self.script.lock().expect("Script lock poisoned.").extend(steps);

		self
	}

	/// Makes the first `count` init calls fail.
	pub fn with_failing_inits(self, count: usize) -> Self {
		self.failing_inits.store(count, Ordering::SeqCst);

		self
	}

	/// Makes the first `count` init calls panic before returning their future.
	pub fn with_panicking_inits(self, count: usize) -> Self {
		self.panicking_inits.store(count, Ordering::SeqCst);

		self
	}

	/// Stretches each init call so concurrent first callers overlap.
	pub fn with_init_delay(mut self, delay: std::time::Duration) -> Self {
		self.init_delay = delay;

		self
	}

	/// Holds every acquisition until [`MockCredential::release`] hands out permits.
	pub fn with_gate(mut self) -> Self {
		self.gate = Some(Arc::new(Semaphore::new(0)));

		self
	}

	/// Holds only acquisitions whose scopes include `scope`.
	pub fn with_gate_for(mut self, scope: &str) -> Self {
		self.gated_scope = Some(scope.to_owned());

		self.with_gate()
	}

	/// Lets `count` gated acquisitions proceed.
	pub fn release(&self, count: usize) {
		if let Some(gate) = &self.gate {
			gate.add_permits(count);
		}
	}

	pub fn init_calls(&self) -> usize {
		self.init_calls.load(Ordering::SeqCst)
	}

	pub fn acquire_calls(&self) -> usize {
		self.acquire_calls.load(Ordering::SeqCst)
	}

	pub fn seen_scopes(&self) -> Vec<Vec<String>> {
		self.seen_scopes.lock().expect("Scope log lock poisoned.").clone()
	}

	fn gate_for(&self, scopes: &[String]) -> Option<Arc<Semaphore>> {
		match &self.gated_scope {
			Some(scope) if !scopes.contains(scope) => None,
			_ => self.gate.clone(),
		}
	}
}
impl TokenCredential for MockCredential {
	fn cache_key(&self) -> String {
		self.key.clone()
	}

	fn init(&self) -> CredentialFuture<'_, ()> {
		self.init_calls.fetch_add(1, Ordering::SeqCst);

		if self
			.panicking_inits
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
			.is_ok()
		{
			panic!("tenant discovery exploded");
		}

		Box::pin(async move {
			if !self.init_delay.is_zero() {
				tokio::time::sleep(self.init_delay).await;
			}

			let failing = self
				.failing_inits
				.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
				.is_ok();

			if failing { Err(CredentialError::rejected("tenant lookup failed")) } else { Ok(()) }
		})
	}

	fn acquire_token<'a>(
		&'a self,
		cancel: &'a CancellationToken,
		scopes: &'a [String],
	) -> CredentialFuture<'a, AccessToken> {
		let call = self.acquire_calls.fetch_add(1, Ordering::SeqCst) + 1;

		self.seen_scopes.lock().expect("Scope log lock poisoned.").push(scopes.to_vec());

		let step = self.script.lock().expect("Script lock poisoned.").pop_front();

		if matches!(step, Some(Step::PanicEager)) {
			panic!("credential exploded before returning a future");
		}

		Box::pin(async move {
			if let Some(gate) = self.gate_for(scopes) {
				tokio::select! {
					permit = gate.acquire() => permit.expect("Gate should stay open.").forget(),
					_ = cancel.cancelled() => return Err(CredentialError::Cancelled),
				}
			}

			match step {
				Some(Step::Fail(reason)) => Err(CredentialError::rejected(reason)),
				Some(Step::Panic) | Some(Step::PanicEager) => panic!("credential exploded"),
				Some(Step::Empty) => Ok(AccessToken::new("", self.clock.now() + self.lifetime)),
				Some(Step::Mint) | None =>
					Ok(AccessToken::new(format!("T{call}"), self.clock.now() + self.lifetime)),
			}
		})
	}
}

pub fn manual_clock() -> Arc<ManualClock> {
	Arc::new(ManualClock::new(START))
}

/// Polls `condition` until it holds, failing the test after five seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
	tokio::time::timeout(std::time::Duration::from_secs(5), async {
		while !condition() {
			tokio::time::sleep(std::time::Duration::from_millis(2)).await;
		}
	})
	.await
	.expect("Condition was not reached within five seconds.");
}
