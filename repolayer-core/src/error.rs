//! Error and result types for repository operations.
//!
//! The taxonomy is deliberately small: store-level failures propagate as
//! [`RepositoryError::Store`], uniqueness violations as
//! [`RepositoryError::DuplicateKey`], and "not found" is a condition rather
//! than an error: operations that can miss return `Option` instead of
//! failing.

use bson::error::Error as BsonError;
use thiserror::Error;

/// Errors surfaced by repositories and their store sessions.
///
/// No operation in this crate retries, backs off, or swallows a store
/// failure; whatever the session reports is carried upward unmodified.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Transport or query failure reported by the underlying store.
    #[error("Store error: {0}")]
    Store(String),
    /// A document with the given identifier already exists in the collection.
    #[error("Duplicate key {id} in collection {collection}")]
    DuplicateKey {
        /// The conflicting identifier, rendered for diagnostics.
        id: String,
        /// The collection that rejected the write.
        collection: String,
    },
    /// Failure converting between an entity and its BSON representation.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A document is structurally unusable (e.g. missing its primary key).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// Error during session construction or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// A specialized `Result` for repository operations.
pub type RepoResult<T> = Result<T, RepositoryError>;

impl From<BsonError> for RepositoryError {
    fn from(err: BsonError) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
