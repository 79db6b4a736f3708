//! Order-independent scope-set keys.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

/// Normalized lookup key for a requested scope list.
///
/// Two lists holding the same scopes in a different order map to the same key. The key is a
/// plain lookup string: duplicates are kept and scope values are not validated.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeKey(String);
impl ScopeKey {
	/// Builds the key for the provided scopes.
	///
	/// No scopes yield the empty key and a single scope is used verbatim. Longer lists are
	/// copied, sorted lexicographically, and joined with a single space.
	pub fn new<S>(scopes: &[S]) -> Self
	where
		S: AsRef<str>,
	{
		match scopes {
			[] => Self::default(),
			[single] => Self(single.as_ref().to_owned()),
			_ => {
				let mut sorted = scopes.iter().map(AsRef::as_ref).collect::<Vec<&str>>();

				sorted.sort_unstable();

				Self(sorted.join(" "))
			},
		}
	}

	/// Returns the normalized key string.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns `true` for the key of an empty scope list.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for ScopeKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ScopeKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for ScopeKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ScopeKey({:?})", self.0)
	}
}
impl Display for ScopeKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Returns the `/.default` scope for a resource audience, e.g.
/// `https://management.azure.com/` becomes `https://management.azure.com/.default`.
pub fn default_scope(resource: &Url) -> String {
	format!("{}/.default", resource.as_str().trim_end_matches('/'))
}
