//! Shared types for the delivery catalog
//!
//! Error codes, the `AppError` response body, domain models and the
//! response envelopes used by the HTTP service and its clients.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
