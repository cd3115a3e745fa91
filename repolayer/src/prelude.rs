//! Convenient re-exports of commonly used types from repolayer.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use repolayer::prelude::*;
//! ```
//!
//! This provides access to:
//! - The entity capability trait and conversion seam
//! - The repository and its configuration
//! - Store session traits and builders
//! - Filter, sort, and paging types
//! - Identifier generation and error types

pub use repolayer_core::{
    entity::{Entity, EntityExt, INTERNAL_ID_FIELD, PUBLIC_ID_FIELD},
    error::{RepoResult, RepositoryError},
    ident::{IdGenerator, UuidGenerator},
    page::{Page, PageRequest, RepositoryConfig},
    query::{CmpOp, Filter, FilterVisitor, FindSpec, IntoFilter, Sort, SortDirection},
    repository::Repository,
    session::{StoreSession, StoreSessionBuilder},
};
