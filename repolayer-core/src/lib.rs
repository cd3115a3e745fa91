//! A generic identity-keyed repository layer over schemaless document stores.
//!
//! This crate is the core of the repolayer project and provides:
//!
//! - **Entity capability** ([`entity`]) - The `Entity` trait and the
//!   public/internal representation conversion seam
//! - **Store session abstraction** ([`session`]) - The collection-level
//!   primitives a backend must supply
//! - **Repository** ([`repository`]) - Typed CRUD, paging, and bulk
//!   operations with uniform tracing and error propagation
//! - **Query values** ([`query`]) - Opaque filter, sort, and projection
//!   types plus the visitor backends translate them with
//! - **Paging contract** ([`page`]) - Skip/take resolution and counted
//!   pages
//! - **Identifier generation** ([`ident`]) - The injected id-generator
//!   collaborator
//! - **Error handling** ([`error`]) - The small store/duplicate-key
//!   taxonomy
//!
//! # Example
//!
//! ```ignore
//! use repolayer_core::{entity::Entity, ident::UuidGenerator, repository::Repository};
//! use bson::Uuid;
//! use serde::{Serialize, Deserialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: Option<Uuid>,
//!     pub name: String,
//! }
//!
//! impl Entity for User {
//!     type Id = Uuid;
//!
//!     fn id(&self) -> Option<&Uuid> {
//!         self.id.as_ref()
//!     }
//!
//!     fn with_id(mut self, id: Uuid) -> Self {
//!         self.id = Some(id);
//!         self
//!     }
//!
//!     fn collection_name() -> &'static str {
//!         "users"
//!     }
//! }
//!
//! # async fn example(session: impl repolayer_core::session::StoreSession) {
//! let users: Repository<_, User> = Repository::new(session, Arc::new(UuidGenerator));
//! # }
//! ```

#[allow(unused_extern_crates)]
extern crate self as repolayer_core;

pub mod entity;
pub mod error;
pub mod ident;
pub mod page;
pub mod query;
pub mod repository;
pub mod session;
