//! Storage ports for the budget and account entities.
//!
//! The application services only see these traits; the SQLite adapters in
//! `crate::persistence` are one implementation.

pub mod account_repository;
pub mod budget_repository;

use thiserror::Error;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored record no longer satisfies the domain invariants
    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}
