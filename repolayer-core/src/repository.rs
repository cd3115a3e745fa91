//! Identity-keyed repository over a document store session.
//!
//! A [`Repository`] turns a raw [`StoreSession`] into a typed repository
//! of entities: paged and unbounded reads, point and bulk lookups, and a
//! mutation set with precise create/set/update semantics. The repository
//! holds no entity state: it is a stateless facade over the session apart
//! from its construction-time configuration.
//!
//! Every operation takes a correlation id as its first argument and emits
//! one structured trace record once its outcome is known. Traces are
//! fire-and-forget: they never gate success or failure.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use repolayer_core::{repository::Repository, ident::UuidGenerator, query::Filter, page::PageRequest};
//!
//! # async fn example(session: impl repolayer_core::session::StoreSession) -> repolayer_core::error::RepoResult<()> {
//! let users: Repository<_, User> = Repository::new(session, Arc::new(UuidGenerator));
//!
//! let created = users.create("req-1", Some(User::named("Alice"))).await?;
//! let page = users
//!     .get_page("req-1", Filter::eq("name", "Alice"), PageRequest::new().with_total(), vec![], vec![])
//!     .await?;
//! # Ok(()) }
//! ```

use bson::Document;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

use crate::{
    entity::{Entity, EntityExt, INTERNAL_ID_FIELD, to_internal_partial},
    error::RepoResult,
    ident::IdGenerator,
    page::{Page, PageRequest, RepositoryConfig},
    query::{Filter, FindSpec, IntoFilter, Sort},
    session::StoreSession,
};

/// A typed, identity-keyed repository bound to one collection.
///
/// The collection name comes from [`Entity::collection_name`]; the
/// identifier generator is injected so tests can substitute a
/// deterministic one.
pub struct Repository<S: StoreSession, E: Entity> {
    session: S,
    collection: String,
    ids: Arc<dyn IdGenerator<E::Id>>,
    config: RepositoryConfig,
}

impl<S: StoreSession, E: Entity> Repository<S, E> {
    /// Creates a repository over `session` with default configuration.
    pub fn new(session: S, ids: Arc<dyn IdGenerator<E::Id>>) -> Self {
        Self {
            session,
            collection: E::collection_name().to_string(),
            ids,
            config: RepositoryConfig::default(),
        }
    }

    /// Replaces the configuration (maximum page size).
    pub fn with_config(mut self, config: RepositoryConfig) -> Self {
        self.config = config;
        self
    }

    /// The collection this repository operates on.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn id_filter(id: E::Id) -> Filter {
        Filter::eq(INTERNAL_ID_FIELD, id)
    }

    fn ids_filter(ids: &[E::Id]) -> Filter {
        Filter::is_in(INTERNAL_ID_FIELD, ids.iter().cloned())
    }

    /// Honors a caller-supplied identifier verbatim; generates one only
    /// when the entity carries none.
    fn ensure_id(&self, item: E) -> (E, E::Id) {
        match item.id().cloned() {
            Some(id) => (item, id),
            None => {
                let id = self.ids.next_id();
                (item.with_id(id.clone()), id)
            }
        }
    }

    /// Retrieves one bounded, optionally counted page.
    ///
    /// Skip and take resolve per [`PageRequest`]: a negative skip is no
    /// skip, an absent or non-positive take is the configured maximum, and
    /// take never exceeds that maximum. When a total is wanted, a second
    /// count query runs with the same filter but none of the find options;
    /// the two round trips are not linked, so the total may disagree with
    /// the data under concurrent writes.
    pub async fn get_page(
        &self,
        cid: &str,
        filter: Filter,
        page: PageRequest,
        sort: Vec<Sort>,
        projection: Vec<String>,
    ) -> RepoResult<Page<E>> {
        let spec = FindSpec {
            skip: page.effective_skip(),
            limit: Some(page.effective_take(self.config.max_page_size)),
            sort,
            projection,
        };

        let data = self
            .session
            .find(&self.collection, filter.clone(), spec)
            .await?
            .into_iter()
            .map(E::from_internal)
            .collect::<RepoResult<Vec<E>>>()?;

        let total = match page.want_total {
            true => Some(
                self.session
                    .count_documents(&self.collection, filter)
                    .await?,
            ),
            false => None,
        };

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            count = data.len(),
            "retrieved page"
        );

        Ok(Page { data, total })
    }

    /// Retrieves every matching document, unbounded and uncounted.
    pub async fn get_list(
        &self,
        cid: &str,
        filter: Filter,
        sort: Vec<Sort>,
        projection: Vec<String>,
    ) -> RepoResult<Vec<E>> {
        let spec = FindSpec { skip: None, limit: None, sort, projection };

        let items = self
            .session
            .find(&self.collection, filter, spec)
            .await?
            .into_iter()
            .map(E::from_internal)
            .collect::<RepoResult<Vec<E>>>()?;

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            count = items.len(),
            "retrieved list"
        );

        Ok(items)
    }

    /// Retrieves one matching document at a random offset, or `None` when
    /// nothing matches.
    ///
    /// Two round trips: a count, then a find skipping a uniformly random
    /// number of documents. The pair is not atomic and the store's natural
    /// order may shift between them, so the sample is an approximation of
    /// uniform, not a guarantee.
    pub async fn get_one_random(&self, cid: &str, filter: Filter) -> RepoResult<Option<E>> {
        let count = self
            .session
            .count_documents(&self.collection, filter.clone())
            .await?;

        let skip = match count {
            0 => 0,
            _ => rand::thread_rng().gen_range(0..count),
        };

        let item = self
            .session
            .find(&self.collection, filter, FindSpec::new().skip(skip).limit(1))
            .await?
            .into_iter()
            .next()
            .map(E::from_internal)
            .transpose()?;

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            found = item.is_some(),
            "retrieved random document"
        );

        Ok(item)
    }

    /// Retrieves the documents whose identifiers are members of `ids`.
    ///
    /// Result order is store-defined and not guaranteed to match `ids`.
    pub async fn get_list_by_ids(&self, cid: &str, ids: &[E::Id]) -> RepoResult<Vec<E>> {
        self.get_list(cid, Self::ids_filter(ids), Vec::new(), Vec::new())
            .await
    }

    /// Point lookup by identifier; `None` (not an error) when missing.
    pub async fn get_one_by_id(&self, cid: &str, id: &E::Id) -> RepoResult<Option<E>> {
        let item = self
            .session
            .find_one(&self.collection, Self::id_filter(id.clone()))
            .await?
            .map(E::from_internal)
            .transpose()?;

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            found = item.is_some(),
            "retrieved document by id"
        );

        Ok(item)
    }

    /// Inserts a new entity; `None` item is a silent no-op.
    ///
    /// A caller-supplied identifier is honored verbatim; an absent one is
    /// generated. Fails with `DuplicateKey` when the identifier already
    /// exists. The returned entity is built from the insert-result image,
    /// never a re-read.
    pub async fn create(&self, cid: &str, item: Option<E>) -> RepoResult<Option<E>> {
        let Some(item) = item else {
            return Ok(None);
        };

        let (item, _) = self.ensure_id(item);
        let stored = self
            .session
            .insert_one(&self.collection, item.to_internal()?)
            .await?;
        let created = E::from_internal(stored)?;

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            "created document"
        );

        Ok(Some(created))
    }

    /// Upserts an entity: replace when the identifier exists, insert when
    /// it does not. `None` item is a silent no-op.
    ///
    /// This is a full replace: fields omitted from `item` vanish from the
    /// stored document, unlike [`update`](Repository::update), which
    /// merges. Identifier resolution is exactly as in
    /// [`create`](Repository::create). Returns the post-replace entity.
    pub async fn set(&self, cid: &str, item: Option<E>) -> RepoResult<Option<E>> {
        let Some(item) = item else {
            return Ok(None);
        };

        let (item, id) = self.ensure_id(item);
        let stored = self
            .session
            .find_one_and_replace(
                &self.collection,
                Self::id_filter(id),
                item.to_internal()?,
                true,
            )
            .await?
            .map(E::from_internal)
            .transpose()?;

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            "upserted document"
        );

        Ok(stored)
    }

    /// Merges every field of `item` into the stored document with the same
    /// identifier.
    ///
    /// Requires both the item and its identifier; a `None` item or an
    /// id-less item returns `None` without error, a deliberate leniency,
    /// not a failure. Fields absent from `item` are left untouched (a
    /// field-level merge, not a replace). Returns the post-update entity,
    /// or `None` when no document matched.
    pub async fn update(&self, cid: &str, item: Option<E>) -> RepoResult<Option<E>> {
        let Some(item) = item else {
            return Ok(None);
        };
        let Some(id) = item.id().cloned() else {
            return Ok(None);
        };

        let mut fields = item.to_internal()?;
        // the primary key addresses the document; it is not a settable field
        fields.remove(INTERNAL_ID_FIELD);

        let updated = self
            .session
            .find_one_and_update(&self.collection, Self::id_filter(id), fields)
            .await?
            .map(E::from_internal)
            .transpose()?;

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            matched = updated.is_some(),
            "updated document"
        );

        Ok(updated)
    }

    /// Merges an explicit sparse field map into the document with the
    /// given identifier.
    ///
    /// Same set-and-return semantics as [`update`](Repository::update),
    /// with the input converted through the partial seam. An absent id, an
    /// absent field map, or a map that is empty once the primary key is
    /// stripped all return `None` without touching the store.
    pub async fn update_partially(
        &self,
        cid: &str,
        id: Option<E::Id>,
        fields: Option<Document>,
    ) -> RepoResult<Option<E>> {
        let (Some(id), Some(fields)) = (id, fields) else {
            return Ok(None);
        };

        let mut fields = to_internal_partial(fields);
        fields.remove(INTERNAL_ID_FIELD);
        if fields.is_empty() {
            return Ok(None);
        }

        let updated = self
            .session
            .find_one_and_update(&self.collection, Self::id_filter(id), fields)
            .await?
            .map(E::from_internal)
            .transpose()?;

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            matched = updated.is_some(),
            "partially updated document"
        );

        Ok(updated)
    }

    /// Deletes the document with the given identifier.
    ///
    /// Returns the pre-delete entity, or `None` when nothing matched;
    /// deleting the same identifier twice is not an error.
    pub async fn delete_by_id(&self, cid: &str, id: &E::Id) -> RepoResult<Option<E>> {
        let deleted = self
            .session
            .find_one_and_delete(&self.collection, Self::id_filter(id.clone()))
            .await?
            .map(E::from_internal)
            .transpose()?;

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            deleted = deleted.is_some(),
            "deleted document by id"
        );

        Ok(deleted)
    }

    /// Deletes every document matching `filter`; returns the count.
    ///
    /// Bulk deletion never returns the deleted documents.
    pub async fn delete_by_filter(&self, cid: &str, filter: Filter) -> RepoResult<u64> {
        let deleted = self.session.delete_many(&self.collection, filter).await?;

        debug!(
            correlation_id = cid,
            collection = %self.collection,
            deleted,
            "deleted documents by filter"
        );

        Ok(deleted)
    }

    /// Deletes the documents whose identifiers are members of `ids`.
    pub async fn delete_by_ids(&self, cid: &str, ids: &[E::Id]) -> RepoResult<u64> {
        self.delete_by_filter(cid, Self::ids_filter(ids)).await
    }

    /// [`get_page`](Repository::get_page) over a typed filter-parameter
    /// value.
    pub async fn get_page_by<F: IntoFilter>(
        &self,
        cid: &str,
        params: F,
        page: PageRequest,
        sort: Vec<Sort>,
        projection: Vec<String>,
    ) -> RepoResult<Page<E>> {
        self.get_page(cid, params.into_filter(), page, sort, projection)
            .await
    }

    /// [`get_list`](Repository::get_list) over a typed filter-parameter
    /// value.
    pub async fn get_list_by<F: IntoFilter>(
        &self,
        cid: &str,
        params: F,
        sort: Vec<Sort>,
        projection: Vec<String>,
    ) -> RepoResult<Vec<E>> {
        self.get_list(cid, params.into_filter(), sort, projection)
            .await
    }

    /// [`delete_by_filter`](Repository::delete_by_filter) over a typed
    /// filter-parameter value.
    pub async fn delete_by<F: IntoFilter>(&self, cid: &str, params: F) -> RepoResult<u64> {
        self.delete_by_filter(cid, params.into_filter()).await
    }
}
