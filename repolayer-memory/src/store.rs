//! In-memory store session.
//!
//! Documents live in per-collection vectors behind an async-aware
//! read-write lock, so the natural result order is insertion order, the
//! property the paging contract's tests lean on. Queries scan the whole
//! collection; that is fine for the development and test workloads this
//! backend exists for.

use async_trait::async_trait;
use bson::{Bson, Document};
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};

use repolayer_core::{
    entity::INTERNAL_ID_FIELD,
    error::{RepoResult, RepositoryError},
    query::{Filter, FindSpec},
    session::{StoreSession, StoreSessionBuilder},
};

use crate::evaluator::{FilterEvaluator, order_documents};

type StoreMap = HashMap<String, Vec<Document>>;

/// Thread-safe in-memory document store session.
///
/// Cloning is cheap and clones share the same underlying data, so one
/// session can serve several repositories at once.
#[derive(Default, Clone, Debug)]
pub struct InMemorySession {
    collections: Arc<RwLock<StoreMap>>,
}

impl InMemorySession {
    /// Creates an empty session with no collections.
    pub fn new() -> Self {
        Self { collections: Arc::new(RwLock::new(StoreMap::new())) }
    }

    /// Creates a builder for constructing an `InMemorySession`.
    pub fn builder() -> InMemorySessionBuilder {
        InMemorySessionBuilder
    }

    fn primary_key(document: &Document, collection: &str) -> RepoResult<Bson> {
        document
            .get(INTERNAL_ID_FIELD)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::InvalidDocument(format!(
                    "document for collection {collection} has no primary key"
                ))
            })
    }

    fn project(document: Document, fields: &[String]) -> Document {
        document
            .into_iter()
            .filter(|(key, _)| key == INTERNAL_ID_FIELD || fields.iter().any(|field| field == key))
            .collect()
    }
}

#[async_trait]
impl StoreSession for InMemorySession {
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        spec: FindSpec,
    ) -> RepoResult<Vec<Document>> {
        let store = self.collections.read().await;

        let mut matched: Vec<Document> = store
            .get(collection)
            .map(|documents| documents.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter(|document| FilterEvaluator::matches(document, &filter))
            .cloned()
            .collect();

        if !spec.sort.is_empty() {
            order_documents(&mut matched, &spec.sort);
        }

        if let Some(skip) = spec.skip {
            matched.drain(..matched.len().min(skip as usize));
        }
        if let Some(limit) = spec.limit {
            matched.truncate(limit.max(0) as usize);
        }

        if spec.projection.is_empty() {
            Ok(matched)
        } else {
            Ok(matched
                .into_iter()
                .map(|document| Self::project(document, &spec.projection))
                .collect())
        }
    }

    async fn count_documents(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        let store = self.collections.read().await;

        Ok(store
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| FilterEvaluator::matches(document, &filter))
                    .count() as u64
            })
            .unwrap_or(0))
    }

    async fn find_one(&self, collection: &str, filter: Filter) -> RepoResult<Option<Document>> {
        let store = self.collections.read().await;

        Ok(store.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| FilterEvaluator::matches(document, &filter))
                .cloned()
        }))
    }

    async fn insert_one(&self, collection: &str, document: Document) -> RepoResult<Document> {
        let id = Self::primary_key(&document, collection)?;
        let mut store = self.collections.write().await;
        let documents = store.entry(collection.to_string()).or_default();

        if documents
            .iter()
            .any(|existing| existing.get(INTERNAL_ID_FIELD) == Some(&id))
        {
            return Err(RepositoryError::DuplicateKey {
                id: id.to_string(),
                collection: collection.to_string(),
            });
        }

        documents.push(document.clone());

        Ok(document)
    }

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Filter,
        document: Document,
        upsert: bool,
    ) -> RepoResult<Option<Document>> {
        let mut store = self.collections.write().await;
        let documents = store.entry(collection.to_string()).or_default();

        match documents
            .iter()
            .position(|existing| FilterEvaluator::matches(existing, &filter))
        {
            Some(index) => {
                documents[index] = document.clone();
                Ok(Some(document))
            }
            None if upsert => {
                Self::primary_key(&document, collection)?;
                documents.push(document.clone());
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Filter,
        fields: Document,
    ) -> RepoResult<Option<Document>> {
        let mut store = self.collections.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(None);
        };

        match documents
            .iter()
            .position(|existing| FilterEvaluator::matches(existing, &filter))
        {
            Some(index) => {
                for (key, value) in fields {
                    documents[index].insert(key, value);
                }
                Ok(Some(documents[index].clone()))
            }
            None => Ok(None),
        }
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Filter,
    ) -> RepoResult<Option<Document>> {
        let mut store = self.collections.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(None);
        };

        match documents
            .iter()
            .position(|existing| FilterEvaluator::matches(existing, &filter))
        {
            Some(index) => Ok(Some(documents.remove(index))),
            None => Ok(None),
        }
    }

    async fn delete_many(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        let mut store = self.collections.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(0);
        };

        let before = documents.len();
        documents.retain(|document| !FilterEvaluator::matches(document, &filter));

        Ok((before - documents.len()) as u64)
    }
}

/// Builder for [`InMemorySession`].
///
/// There is nothing to configure today; the builder exists so callers can
/// construct every backend through the same [`StoreSessionBuilder`] seam.
#[derive(Debug, Default)]
pub struct InMemorySessionBuilder;

#[async_trait]
impl StoreSessionBuilder for InMemorySessionBuilder {
    type Session = InMemorySession;

    async fn build(self) -> RepoResult<Self::Session> {
        Ok(InMemorySession::new())
    }
}
