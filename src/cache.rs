//! Two-level token cache: credential entries keyed by identity, scope entries keyed by
//! normalized scope set.
//!
//! [`TokenCache::get_access_token`] resolves (or creates) the credential entry, makes sure the
//! credential ran its one-time `init`, resolves (or creates) the scope entry, and then either
//! serves the cached token or joins the single refresh in flight for that pair. Entries are
//! never evicted; every pair ever requested stays for the lifetime of the cache.

mod credential_entry;
mod metrics;
mod scope_entry;

pub use self::metrics::CacheMetrics;

// crates.io
use dashmap::DashMap;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeKey},
	cache::credential_entry::CredentialEntry,
	clock::{Clock, SystemClock},
	credential::TokenCredential,
	obs::{self, CacheOp, CacheSpan, OpOutcome},
};

/// State shared by every entry of one cache instance.
pub(crate) struct Shared {
	pub(crate) expiry_buffer: Duration,
	pub(crate) clock: Arc<dyn Clock>,
	pub(crate) metrics: CacheMetrics,
}
impl Shared {
	pub(crate) fn new(expiry_buffer: Duration, clock: Arc<dyn Clock>) -> Self {
		Self { expiry_buffer, clock, metrics: CacheMetrics::default() }
	}
}

struct Inner {
	credentials: DashMap<String, Arc<CredentialEntry>>,
	shared: Shared,
}

/// Concurrency-safe access token cache.
///
/// Cloning is cheap and every clone shares the same entries. Concurrent callers asking for the
/// same credential and scope set share one token acquisition; distinct pairs never block each
/// other.
#[derive(Clone)]
pub struct TokenCache {
	inner: Arc<Inner>,
}
impl TokenCache {
	/// Look-ahead window inside which a token is treated as already expired.
	pub const DEFAULT_EXPIRY_BUFFER: Duration = Duration::minutes(2);

	/// Creates a cache with the default expiry buffer and the system clock.
	pub fn new() -> Self {
		Self::builder().build()
	}

	/// Returns a builder for tuning the expiry buffer or time source.
	pub fn builder() -> TokenCacheBuilder {
		TokenCacheBuilder::default()
	}

	/// Returns a valid access token string for `credential` and `scopes`.
	///
	/// `scopes` may be empty and may come in any order. `cancel` is handed to the credential
	/// when this call performs the refresh, and ends this call early with
	/// [`Error::Cancelled`] while it is waiting on another caller.
	pub async fn get_access_token<S>(
		&self,
		cancel: &CancellationToken,
		credential: Arc<dyn TokenCredential>,
		scopes: &[S],
	) -> Result<String>
	where
		S: AsRef<str> + Sync,
	{
		self.get_token(cancel, credential, scopes)
			.await
			.map(|token| token.expose().to_owned())
	}

	/// Same as [`get_access_token`](Self::get_access_token) but returns the whole
	/// [`AccessToken`], expiry included.
	pub async fn get_token<S>(
		&self,
		cancel: &CancellationToken,
		credential: Arc<dyn TokenCredential>,
		scopes: &[S],
	) -> Result<AccessToken>
	where
		S: AsRef<str> + Sync,
	{
		const OP: CacheOp = CacheOp::GetToken;

		let key = credential.cache_key();
		let span = CacheSpan::new(OP, "get_token", &key);

		obs::record_cache_op(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				let shared = &self.inner.shared;
				let entry = self.credential_entry(key, credential);

				entry.ensure_initialized(cancel, shared).await?;

				let scope_entry = entry.scope_entry(scopes);

				scope_entry.access_token(entry.credential(), cancel, shared).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_cache_op(OP, OpOutcome::Success),
			Err(err) if err.is_cancelled() => obs::record_cache_op(OP, OpOutcome::Cancelled),
			Err(_) => obs::record_cache_op(OP, OpOutcome::Failure),
		}

		result
	}

	/// Returns the last token stored for the pair without refreshing, even if it is stale.
	pub fn cached_token<S>(
		&self,
		credential: &dyn TokenCredential,
		scopes: &[S],
	) -> Option<AccessToken>
	where
		S: AsRef<str>,
	{
		let entry = self.inner.credentials.get(&credential.cache_key())?.value().clone();
		let key = ScopeKey::new(scopes);

		entry.existing_scope_entry(&key)?.cached()
	}

	/// Number of distinct credential identity keys seen so far.
	pub fn credential_count(&self) -> usize {
		self.inner.credentials.len()
	}

	/// Number of distinct scope sets requested for a credential identity key.
	pub fn scope_count(&self, cache_key: &str) -> usize {
		self.inner.credentials.get(cache_key).map_or(0, |entry| entry.value().scope_count())
	}

	/// Returns `true` once the credential with `cache_key` finished its one-time `init`.
	pub fn is_initialized(&self, cache_key: &str) -> bool {
		self.inner.credentials.get(cache_key).is_some_and(|entry| entry.value().is_initialized())
	}

	/// Look-ahead window this cache applies to token expiry.
	pub fn expiry_buffer(&self) -> Duration {
		self.inner.shared.expiry_buffer
	}

	/// Counters describing how requests were served.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.inner.shared.metrics
	}

	fn credential_entry(
		&self,
		key: String,
		credential: Arc<dyn TokenCredential>,
	) -> Arc<CredentialEntry> {
		if let Some(entry) = self.inner.credentials.get(&key) {
			return entry.value().clone();
		}

		self.inner
			.credentials
			.entry(key.clone())
			.or_insert_with(|| Arc::new(CredentialEntry::new(key, credential)))
			.value()
			.clone()
	}
}
impl Default for TokenCache {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("credentials", &self.inner.credentials.len())
			.field("expiry_buffer", &self.inner.shared.expiry_buffer)
			.field("metrics", &self.inner.shared.metrics)
			.finish()
	}
}

/// Builder for [`TokenCache`].
pub struct TokenCacheBuilder {
	expiry_buffer: Duration,
	clock: Arc<dyn Clock>,
}
impl TokenCacheBuilder {
	/// Overrides the expiry look-ahead window (defaults to two minutes).
	///
	/// Negative values clamp to zero.
	pub fn expiry_buffer(mut self, buffer: Duration) -> Self {
		self.expiry_buffer = if buffer.is_negative() { Duration::ZERO } else { buffer };

		self
	}

	/// Replaces the time source used for freshness checks.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Consumes the builder and produces an empty [`TokenCache`].
	pub fn build(self) -> TokenCache {
		TokenCache {
			inner: Arc::new(Inner {
				credentials: DashMap::new(),
				shared: Shared::new(self.expiry_buffer, self.clock),
			}),
		}
	}
}
impl Default for TokenCacheBuilder {
	fn default() -> Self {
		Self { expiry_buffer: TokenCache::DEFAULT_EXPIRY_BUFFER, clock: Arc::new(SystemClock) }
	}
}
impl Debug for TokenCacheBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCacheBuilder").field("expiry_buffer", &self.expiry_buffer).finish()
	}
}
