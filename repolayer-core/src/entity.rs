//! Entity capability trait and representation conversion.
//!
//! An [`Entity`] is any application record with a unique identifier field
//! named `id`; everything else is opaque payload. The store keeps the
//! identifier under its own primary-key field, so every operation passes
//! through the conversion seam in this module: [`to_internal_document`]
//! renames `id` to `_id` on the way in, [`to_public_document`] renames it
//! back on the way out, and [`to_internal_partial`] does the same for the
//! sparse field maps used by partial updates. The conversions are pure,
//! order-preserving, and inverses of each other.
//!
//! # Example
//!
//! ```ignore
//! use repolayer_core::entity::Entity;
//! use bson::Uuid;
//! use serde::{Serialize, Deserialize};
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
//! ```

use bson::{Bson, Document, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::{RepoResult, RepositoryError};

/// The identifier field name in the public representation.
pub const PUBLIC_ID_FIELD: &str = "id";

/// The primary-key field name in the store's internal representation.
pub const INTERNAL_ID_FIELD: &str = "_id";

/// Capability trait for identity-keyed application records.
///
/// An absent identifier means "not assigned yet"; the mutation engine
/// generates one before the store ever sees the document. A present
/// identifier is always honored verbatim and never overwritten.
pub trait Entity: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// The identifier type: a string or comparable scalar.
    type Id: Clone + Debug + Into<Bson> + Send + Sync + 'static;

    /// The identifier, when assigned.
    fn id(&self) -> Option<&Self::Id>;

    /// Returns this entity with the identifier assigned.
    fn with_id(self, id: Self::Id) -> Self;

    /// The collection this entity type is stored in.
    fn collection_name() -> &'static str;
}

/// Renames the public identifier field to the store primary-key field.
///
/// All other fields pass through untouched, in order.
pub fn to_internal_document(document: Document) -> Document {
    rename_field(document, PUBLIC_ID_FIELD, INTERNAL_ID_FIELD)
}

/// Renames the store primary-key field back to the public identifier field.
pub fn to_public_document(document: Document) -> Document {
    rename_field(document, INTERNAL_ID_FIELD, PUBLIC_ID_FIELD)
}

/// Applies the internal rename to a sparse field map.
///
/// Used by partial updates, where the input is a subset of fields rather
/// than a full entity.
pub fn to_internal_partial(fields: Document) -> Document {
    rename_field(fields, PUBLIC_ID_FIELD, INTERNAL_ID_FIELD)
}

fn rename_field(document: Document, from: &str, to: &str) -> Document {
    document
        .into_iter()
        .map(|(key, value)| {
            if key == from {
                (to.to_string(), value)
            } else {
                (key, value)
            }
        })
        .collect()
}

/// Serialization utilities composing the BSON codec with the id rename.
///
/// Implemented for every [`Entity`]; `from_internal(to_internal(e))`
/// reproduces `e` for every field the public model defines.
pub trait EntityExt: Entity {
    /// Serializes this entity into its internal store representation.
    fn to_internal(&self) -> RepoResult<Document>;

    /// Deserializes an entity from its internal store representation.
    fn from_internal(document: Document) -> RepoResult<Self>;
}

impl<E: Entity> EntityExt for E {
    fn to_internal(&self) -> RepoResult<Document> {
        let document = serialize_to_bson(self)?
            .as_document()
            .cloned()
            .ok_or_else(|| {
                RepositoryError::InvalidDocument("entity did not serialize to a document".into())
            })?;

        Ok(to_internal_document(document))
    }

    fn from_internal(document: Document) -> RepoResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(to_public_document(
            document,
        )))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Option<String>,
        title: String,
        pinned: bool,
    }

    impl Entity for Note {
        type Id = String;

        fn id(&self) -> Option<&String> {
            self.id.as_ref()
        }

        fn with_id(mut self, id: String) -> Self {
            self.id = Some(id);
            self
        }

        fn collection_name() -> &'static str {
            "notes"
        }
    }

    #[test]
    fn internal_rename_is_order_preserving() {
        let internal = to_internal_document(doc! { "id": "n-1", "title": "hello" });

        assert_eq!(internal, doc! { "_id": "n-1", "title": "hello" });
        assert_eq!(internal.keys().next().map(String::as_str), Some("_id"));
    }

    #[test]
    fn conversions_are_inverses() {
        let public = doc! { "id": "n-1", "title": "hello", "pinned": true };

        assert_eq!(
            to_public_document(to_internal_document(public.clone())),
            public
        );
    }

    #[test]
    fn partial_rename_only_touches_the_id() {
        let fields = to_internal_partial(doc! { "title": "renamed", "id": "n-9" });

        assert_eq!(fields, doc! { "title": "renamed", "_id": "n-9" });
    }

    #[test]
    fn entity_round_trips_through_internal_form() {
        let note = Note {
            id: Some("n-42".into()),
            title: "groceries".into(),
            pinned: false,
        };

        let internal = note.to_internal().unwrap();
        assert!(internal.contains_key(INTERNAL_ID_FIELD));
        assert!(!internal.contains_key(PUBLIC_ID_FIELD));

        let restored = Note::from_internal(internal).unwrap();
        assert_eq!(restored, note);
    }
}
