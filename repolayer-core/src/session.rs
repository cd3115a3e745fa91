//! Store session abstraction: the collaborator owning the live connection.
//!
//! A [`StoreSession`] exposes the eight collection-level primitives the
//! repository is built on. Everything above this trait is contract logic;
//! everything below it (connection pooling, credentials, wire protocol)
//! belongs to the implementation and is out of scope here.
//!
//! # Traits
//!
//! - [`StoreSession`]: the collection-level primitive set
//! - [`StoreSessionBuilder`]: async factory for session construction
//!
//! # Concurrency
//!
//! Implementations must be `Send + Sync` and safe under concurrent calls
//! from multiple async tasks. The `find_one_and_*` primitives must be
//! atomic at the store: the read-modify-write inside one mutation never
//! interleaves with another writer. Pairs of calls made by the repository
//! (a find plus a count, a count plus a skip-read) are *not* atomic as a
//! pair; that non-atomicity is part of the published contract.

use async_trait::async_trait;
use bson::Document;
use std::{fmt::Debug, sync::Arc};

use crate::{error::RepoResult, query::{Filter, FindSpec}};

/// Collection-level document store primitives.
///
/// All documents crossing this boundary are in the store's *internal*
/// representation (primary key under `_id`); the repository performs the
/// public/internal conversion on both sides of every call.
///
/// # Error Handling
///
/// Operations return [`RepoResult`](crate::error::RepoResult). Transport
/// and query failures surface as the `Store` error variant; uniqueness
/// violations from `insert_one` and upserting `find_one_and_replace`
/// surface as `DuplicateKey`. Implementations never retry.
#[async_trait]
pub trait StoreSession: Send + Sync + Debug {
    /// Finds documents matching `filter`, shaped by `spec`.
    ///
    /// Results come back in the store's natural order unless `spec.sort`
    /// is non-empty. Empty sort and projection lists must be omitted from
    /// the store request entirely.
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        spec: FindSpec,
    ) -> RepoResult<Vec<Document>>;

    /// Counts documents matching `filter`.
    ///
    /// A count never observes skip, limit, sort, or projection.
    async fn count_documents(&self, collection: &str, filter: Filter) -> RepoResult<u64>;

    /// Returns the first document matching `filter`, or `None`.
    async fn find_one(&self, collection: &str, filter: Filter) -> RepoResult<Option<Document>>;

    /// Inserts one document and returns the stored image.
    ///
    /// The returned document is the insert-result representation, not a
    /// re-read. Fails with `DuplicateKey` when the primary key already
    /// exists.
    async fn insert_one(&self, collection: &str, document: Document) -> RepoResult<Document>;

    /// Atomically replaces the first document matching `filter`.
    ///
    /// With `upsert` the document is inserted when nothing matches.
    /// Returns the post-replace image, or `None` when nothing matched and
    /// `upsert` was false.
    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Filter,
        document: Document,
        upsert: bool,
    ) -> RepoResult<Option<Document>>;

    /// Atomically sets `fields` on the first document matching `filter`.
    ///
    /// A field-level merge: fields absent from `fields` are left
    /// untouched. Returns the post-update image, or `None` when nothing
    /// matched.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Filter,
        fields: Document,
    ) -> RepoResult<Option<Document>>;

    /// Atomically deletes the first document matching `filter`.
    ///
    /// Returns the pre-delete image, or `None` when nothing matched.
    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Filter,
    ) -> RepoResult<Option<Document>>;

    /// Deletes every document matching `filter`; returns the deleted count.
    async fn delete_many(&self, collection: &str, filter: Filter) -> RepoResult<u64>;
}

#[async_trait]
impl<S> StoreSession for &S
where
    S: StoreSession,
{
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        spec: FindSpec,
    ) -> RepoResult<Vec<Document>> {
        (*self).find(collection, filter, spec).await
    }

    async fn count_documents(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        (*self).count_documents(collection, filter).await
    }

    async fn find_one(&self, collection: &str, filter: Filter) -> RepoResult<Option<Document>> {
        (*self).find_one(collection, filter).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> RepoResult<Document> {
        (*self).insert_one(collection, document).await
    }

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Filter,
        document: Document,
        upsert: bool,
    ) -> RepoResult<Option<Document>> {
        (*self)
            .find_one_and_replace(collection, filter, document, upsert)
            .await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Filter,
        fields: Document,
    ) -> RepoResult<Option<Document>> {
        (*self)
            .find_one_and_update(collection, filter, fields)
            .await
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Filter,
    ) -> RepoResult<Option<Document>> {
        (*self)
            .find_one_and_delete(collection, filter)
            .await
    }

    async fn delete_many(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        (*self).delete_many(collection, filter).await
    }
}

#[async_trait]
impl<S> StoreSession for Arc<S>
where
    S: StoreSession,
{
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        spec: FindSpec,
    ) -> RepoResult<Vec<Document>> {
        (**self).find(collection, filter, spec).await
    }

    async fn count_documents(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        (**self).count_documents(collection, filter).await
    }

    async fn find_one(&self, collection: &str, filter: Filter) -> RepoResult<Option<Document>> {
        (**self).find_one(collection, filter).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> RepoResult<Document> {
        (**self).insert_one(collection, document).await
    }

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Filter,
        document: Document,
        upsert: bool,
    ) -> RepoResult<Option<Document>> {
        (**self)
            .find_one_and_replace(collection, filter, document, upsert)
            .await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Filter,
        fields: Document,
    ) -> RepoResult<Option<Document>> {
        (**self)
            .find_one_and_update(collection, filter, fields)
            .await
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Filter,
    ) -> RepoResult<Option<Document>> {
        (**self)
            .find_one_and_delete(collection, filter)
            .await
    }

    async fn delete_many(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        (**self).delete_many(collection, filter).await
    }
}

/// Async factory for store sessions.
#[async_trait]
pub trait StoreSessionBuilder {
    /// The session type this builder produces.
    type Session: StoreSession;

    /// Builds the session, establishing whatever the backend needs.
    async fn build(self) -> RepoResult<Self::Session>;
}
