//! Data models
//!
//! Shared between the catalog service and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGSERIAL), timestamps are Unix millis.

pub mod address;
pub mod category;
pub mod favorite;
pub mod product;
pub mod store;

// Re-exports
pub use address::*;
pub use category::*;
pub use favorite::*;
pub use product::*;
pub use store::*;
