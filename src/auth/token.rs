//! Access token value objects.

pub mod access;
pub mod secret;
