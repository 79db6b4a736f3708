//! Immutable access token paired with its expiry instant.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access token returned by a credential exchange.
///
/// Tokens are replaced wholesale when a refresh succeeds; the cache never edits one in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Raw bearer token; callers must avoid logging it.
	pub token: TokenSecret,
	/// Instant after which the provider stops accepting the token.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_on: OffsetDateTime,
}
impl AccessToken {
	/// Pairs a raw token with its expiry instant.
	pub fn new(token: impl Into<String>, expires_on: OffsetDateTime) -> Self {
		Self { token: TokenSecret::new(token), expires_on }
	}

	/// Returns the raw token string.
	pub fn expose(&self) -> &str {
		self.token.expose()
	}

	/// Remaining validity at `now`; negative once the token has expired.
	pub fn expires_in(&self, now: OffsetDateTime) -> Duration {
		self.expires_on - now
	}

	/// Returns `true` while the token stays valid for strictly longer than `buffer` past `now`.
	///
	/// A token with exactly `buffer` left is already stale, so callers never hand out a token
	/// that could expire while the request carrying it is still in flight. A buffer reaching past
	/// the representable date range makes every token stale.
	pub fn is_fresh_at(&self, now: OffsetDateTime, buffer: Duration) -> bool {
		now.checked_add(buffer).is_some_and(|edge| self.expires_on > edge)
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("token", &"<redacted>")
			.field("expires_on", &self.expires_on)
			.finish()
	}
}
