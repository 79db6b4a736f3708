//! Capability contract for credentials whose tokens the cache manages.

// self
use crate::{_prelude::*, auth::AccessToken, error::CredentialError};

/// Boxed future returned by [`TokenCredential`] operations.
pub type CredentialFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, CredentialError>> + 'a + Send>>;

/// A credential that can mint access tokens for scope sets.
///
/// The cache treats implementations as opaque: it only reads the identity key, runs
/// [`init`](Self::init) once per key, and calls [`acquire_token`](Self::acquire_token) while
/// holding none of its internal locks.
pub trait TokenCredential
where
	Self: Send + Sync,
{
	/// Stable identity key; credentials sharing a key share cache entries.
	fn cache_key(&self) -> String;

	/// One-time setup.
	///
	/// The cache runs this at most once successfully per identity key and retries it on the
	/// next request after a failure.
	fn init(&self) -> CredentialFuture<'_, ()>;

	/// Exchanges the credential for a token covering `scopes`.
	///
	/// `scopes` are passed in the order the first requester supplied them. Implementations
	/// should watch `cancel` and give up with [`CredentialError::Cancelled`] once it fires.
	fn acquire_token<'a>(
		&'a self,
		cancel: &'a CancellationToken,
		scopes: &'a [String],
	) -> CredentialFuture<'a, AccessToken>;
}
