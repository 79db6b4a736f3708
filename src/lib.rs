//! Concurrency-safe access token cache: lazy one-time credential initialization,
//! order-independent scope keys, and a single in-flight refresh per credential/scope pair.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use scoped_token_cache::{CancellationToken, Result, TokenCache, TokenCredential};
//! # async fn demo(credential: Arc<dyn TokenCredential>) -> Result<()> {
//! let cache = TokenCache::new();
//! let cancel = CancellationToken::new();
//! let token = cache
//! 	.get_access_token(&cancel, credential, &["https://management.azure.com/.default"])
//! 	.await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod clock;
pub mod credential;
pub mod error;
pub mod obs;

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tokio_util::sync::CancellationToken;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use tokio_util::sync::CancellationToken;
pub use url;

pub use crate::{
	auth::{AccessToken, ScopeKey},
	cache::TokenCache,
	credential::TokenCredential,
	error::{CredentialError, Error, Result},
};

#[cfg(test)] use {color_eyre as _, serde_json as _};
