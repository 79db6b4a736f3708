//! Token values and scope-set cache keys.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::{access::*, secret::*};
