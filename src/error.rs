//! Cache-level error types shared by the facade, credential contract, and entries.

// std
use std::any::Any;
// self
use crate::_prelude::*;

/// Cache-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical cache error exposed by public APIs.
///
/// Every variant is transient from the cache's point of view: nothing is recorded in the
/// entry, and the next request for the same credential/scope pair retries from scratch.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The credential's one-time setup failed; the next request retries it.
	#[error("Credential `{key}` failed to initialize.")]
	Initialization {
		/// Identity key of the credential that failed.
		key: String,
		/// Failure reported by the credential.
		#[source]
		source: CredentialError,
	},
	/// The token exchange for a scope set failed; the cached token (if any) is kept.
	#[error("Token acquisition failed for scopes `{scopes}`.")]
	Refresh {
		/// Normalized scope key of the failed exchange.
		scopes: String,
		/// Failure reported by the credential.
		#[source]
		source: CredentialError,
	},
	/// The credential reported success but handed back an empty token string.
	#[error("Credential returned an empty access token for scopes `{scopes}`.")]
	EmptyToken {
		/// Normalized scope key of the exchange.
		scopes: String,
	},
	/// The caller's cancellation signal fired while it was waiting on another caller.
	#[error("Request was cancelled while waiting for {stage}.")]
	Cancelled {
		/// Which wait was interrupted.
		stage: &'static str,
	},
}
impl Error {
	/// Returns `true` when the error came from the caller's own cancellation signal.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled { .. })
	}

	/// Returns the credential failure behind this error, when there is one.
	pub fn credential_error(&self) -> Option<&CredentialError> {
		match self {
			Self::Initialization { source, .. } | Self::Refresh { source, .. } => Some(source),
			_ => None,
		}
	}
}

/// Failures surfaced by [`TokenCredential`](crate::credential::TokenCredential)
/// implementations.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// The identity provider rejected the request.
	#[error("Credential was rejected: {reason}.")]
	Rejected {
		/// Provider- or credential-supplied reason string.
		reason: String,
	},
	/// The credential observed its cancellation signal and gave up.
	#[error("Credential operation was cancelled.")]
	Cancelled,
	/// Network, IO, or other transport failure.
	#[error("Credential transport failed.")]
	Transport {
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
	/// The credential panicked; the cache recovered and released its waiters.
	#[error("Credential panicked: {message}.")]
	Panicked {
		/// Panic payload rendered as text.
		message: String,
	},
}
impl CredentialError {
	/// Builds a [`CredentialError::Rejected`] from any displayable reason.
	pub fn rejected(reason: impl Into<String>) -> Self {
		Self::Rejected { reason: reason.into() }
	}

	/// Wraps a transport-specific failure.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
		let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
			(*message).to_owned()
		} else if let Some(message) = payload.downcast_ref::<String>() {
			message.clone()
		} else {
			"non-string panic payload".to_owned()
		};

		Self::Panicked { message }
	}
}
impl From<std::io::Error> for CredentialError {
	fn from(e: std::io::Error) -> Self {
		Self::transport(e)
	}
}
