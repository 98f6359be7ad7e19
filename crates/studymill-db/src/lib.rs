//! Studymill database layer
//!
//! Durable storage for generated study material (PostgreSQL via `sqlx`).

pub mod db;

pub use db::{MaterialRepository, PersistenceError, ResultStore};
