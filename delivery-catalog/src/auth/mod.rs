//! Caller identity: bearer token filter and the `CurrentUser` extractor

pub mod extractor;
pub mod identity;

pub use extractor::{CurrentUser, Role};
pub use identity::identity_middleware;
