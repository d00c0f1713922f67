//! # autoapply-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `autoapply-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `autoapply-app` (for port traits) and `autoapply-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod outcome_store;
pub mod pool;
pub mod rule_repo;
pub mod schedule_repo;
mod timestamp;

pub use outcome_store::SqliteOutcomeStore;
pub use pool::{Config, Database};
pub use rule_repo::SqliteAutomationRuleRepository;
pub use schedule_repo::SqliteScheduleRepository;
