use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions, ReturnDocument},
};

use repolayer_core::{
    entity::INTERNAL_ID_FIELD,
    error::{RepoResult, RepositoryError},
    query::{Filter, FilterVisitor, FindSpec, Sort, SortDirection},
    session::{StoreSession, StoreSessionBuilder},
};

use crate::query::MongoFilterTranslator;

#[derive(Debug)]
pub struct MongoSession {
    client: Client,
    database: String,
}

impl MongoSession {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoSessionBuilder {
        MongoSessionBuilder::new(dsn, database)
    }

    fn collection(&self, name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(name)
    }

    fn filter_document(filter: &Filter) -> RepoResult<Document> {
        MongoFilterTranslator.visit_filter(filter)
    }

    fn sort_document(sort: &[Sort]) -> Document {
        sort.iter()
            .map(|key| {
                (
                    key.field.clone(),
                    Bson::Int32(match key.direction {
                        SortDirection::Asc => 1,
                        SortDirection::Desc => -1,
                    }),
                )
            })
            .collect()
    }

    fn projection_document(fields: &[String]) -> Document {
        fields
            .iter()
            .map(|field| (field.clone(), Bson::Int32(1)))
            .collect()
    }

    fn store_error(error: mongodb::error::Error) -> RepositoryError {
        RepositoryError::Store(error.to_string())
    }

    fn write_error(error: mongodb::error::Error, id: &Bson, collection: &str) -> RepositoryError {
        // server code 11000 is the unique-index violation
        match &*error.kind {
            ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == 11000 => {
                RepositoryError::DuplicateKey {
                    id: id.to_string(),
                    collection: collection.to_string(),
                }
            }
            _ => Self::store_error(error),
        }
    }
}

#[async_trait]
impl StoreSession for MongoSession {
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        spec: FindSpec,
    ) -> RepoResult<Vec<Document>> {
        let mut options = FindOptions::default();
        options.skip = spec.skip;
        options.limit = spec.limit;
        if !spec.sort.is_empty() {
            options.sort = Some(Self::sort_document(&spec.sort));
        }
        if !spec.projection.is_empty() {
            options.projection = Some(Self::projection_document(&spec.projection));
        }

        self.collection(collection)
            .find(Self::filter_document(&filter)?)
            .with_options(options)
            .await
            .map_err(Self::store_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(Self::store_error)
    }

    async fn count_documents(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        self.collection(collection)
            .count_documents(Self::filter_document(&filter)?)
            .await
            .map_err(Self::store_error)
    }

    async fn find_one(&self, collection: &str, filter: Filter) -> RepoResult<Option<Document>> {
        self.collection(collection)
            .find_one(Self::filter_document(&filter)?)
            .await
            .map_err(Self::store_error)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> RepoResult<Document> {
        let id = document
            .get(INTERNAL_ID_FIELD)
            .cloned()
            .unwrap_or(Bson::Null);

        self.collection(collection)
            .insert_one(&document)
            .await
            .map_err(|error| Self::write_error(error, &id, collection))?;

        Ok(document)
    }

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Filter,
        document: Document,
        upsert: bool,
    ) -> RepoResult<Option<Document>> {
        let id = document
            .get(INTERNAL_ID_FIELD)
            .cloned()
            .unwrap_or(Bson::Null);

        self.collection(collection)
            .find_one_and_replace(Self::filter_document(&filter)?, document)
            .upsert(upsert)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|error| Self::write_error(error, &id, collection))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Filter,
        fields: Document,
    ) -> RepoResult<Option<Document>> {
        self.collection(collection)
            .find_one_and_update(Self::filter_document(&filter)?, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await
            .map_err(Self::store_error)
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Filter,
    ) -> RepoResult<Option<Document>> {
        self.collection(collection)
            .find_one_and_delete(Self::filter_document(&filter)?)
            .await
            .map_err(Self::store_error)
    }

    async fn delete_many(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        Ok(self
            .collection(collection)
            .delete_many(Self::filter_document(&filter)?)
            .await
            .map_err(Self::store_error)?
            .deleted_count)
    }
}

pub struct MongoSessionBuilder {
    dsn: String,
    database: String,
}

impl MongoSessionBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreSessionBuilder for MongoSessionBuilder {
    type Session = MongoSession;

    async fn build(self) -> RepoResult<Self::Session> {
        Ok(MongoSession::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|error| RepositoryError::Initialization(error.to_string()))?,
            )
            .map_err(|error| RepositoryError::Initialization(error.to_string()))?,
            self.database,
        ))
    }
}
