//! Database repositories for data access layer
//!
//! Repositories own a `PgPool` handle and expose one method per query.

pub mod material;

pub use material::{MaterialRepository, PersistenceError, ResultStore};
