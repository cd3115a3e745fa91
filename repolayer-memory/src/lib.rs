//! In-memory store session backend for repolayer.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreSession` trait using async-aware read-write locks. It is the
//! substrate for development, testing, and small-scale deployments; the
//! natural result order is insertion order, which makes paging behavior
//! deterministic under test.
//!
//! # Quick Start
//!
//! ```ignore
//! use repolayer::{memory::InMemorySession, repository::Repository, ident::UuidGenerator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = InMemorySession::new();
//!     let users: Repository<_, User> = Repository::new(session, Arc::new(UuidGenerator));
//!
//!     let created = users.create("req-1", Some(User::named("Alice"))).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as repolayer_memory;

pub mod evaluator;
pub mod store;

pub use store::{InMemorySession, InMemorySessionBuilder};
