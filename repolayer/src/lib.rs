//! Main repolayer crate providing a unified interface for identity-keyed
//! document repositories.
//!
//! This crate is the primary entry point for users of the repolayer
//! framework. It re-exports the core types from the sub-crates and
//! provides convenient access to the store session backends.
//!
//! # Features
//!
//! - **Typed repositories** - Treat any document collection as a
//!   repository of entities with a unique identifier
//! - **Precise mutation contract** - Create, upserting set, merging
//!   update, sparse partial update, point and bulk delete
//! - **Paging** - Bounded, optionally counted pages with skip/take
//!   resolution against a configured maximum
//! - **Multiple backends** - In-memory and MongoDB sessions behind one
//!   trait
//!
//! # Quick Start
//!
//! ```ignore
//! use repolayer::{prelude::*, memory::InMemorySession};
//! use serde::{Serialize, Deserialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: Option<String>,
//!     pub name: String,
//! }
//!
//! impl Entity for User {
//!     type Id = String;
//!
//!     fn id(&self) -> Option<&String> { self.id.as_ref() }
//!     fn with_id(mut self, id: String) -> Self { self.id = Some(id); self }
//!     fn collection_name() -> &'static str { "users" }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let session = InMemorySession::new();
//!     let users: Repository<_, User> = Repository::new(session, Arc::new(UuidGenerator));
//!
//!     // Insert a user; the identifier is generated because none was supplied
//!     let alice = users
//!         .create("req-1", Some(User { id: None, name: "Alice".to_string() }))
//!         .await
//!         .unwrap()
//!         .unwrap();
//!
//!     // Page through users named Alice, with a total count
//!     let page = users
//!         .get_page(
//!             "req-1",
//!             Filter::eq("name", "Alice"),
//!             PageRequest::new().take(10).with_total(),
//!             vec![],
//!             vec![],
//!         )
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(page.data, vec![alice]);
//!     assert_eq!(page.total, Some(1));
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory session for development and testing
//! - [`mongodb`] - Persistent MongoDB session (requires the `mongodb`
//!   feature)

pub mod prelude;

pub use repolayer_core::{entity, error, ident, page, query, repository, session};

// Re-export BSON types for convenience
pub use bson;

/// In-memory store session implementations.
pub mod memory {
    pub use repolayer_memory::{InMemorySession, InMemorySessionBuilder};
}

/// MongoDB store session implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use repolayer_mongodb::{MongoSession, MongoSessionBuilder};
}
