use bson::doc;
use repolayer_core::{
    error::RepositoryError,
    query::{Filter, FindSpec, Sort},
    session::StoreSession,
};
use repolayer_memory::InMemorySession;

const COLLECTION: &str = "notes";

async fn seeded_session() -> InMemorySession {
    let session = InMemorySession::new();
    for (id, rank) in [("n-1", 3), ("n-2", 1), ("n-3", 2)] {
        session
            .insert_one(COLLECTION, doc! { "_id": id, "rank": rank, "kind": "note" })
            .await
            .unwrap();
    }
    session
}

#[tokio::test]
async fn insert_returns_stored_image_and_find_one_sees_it() {
    let session = InMemorySession::new();

    let stored = session
        .insert_one(COLLECTION, doc! { "_id": "n-1", "title": "hello" })
        .await
        .unwrap();
    assert_eq!(stored, doc! { "_id": "n-1", "title": "hello" });

    let found = session
        .find_one(COLLECTION, Filter::eq("_id", "n-1"))
        .await
        .unwrap();
    assert_eq!(found, Some(doc! { "_id": "n-1", "title": "hello" }));
}

#[tokio::test]
async fn duplicate_primary_key_is_rejected() {
    let session = InMemorySession::new();
    session
        .insert_one(COLLECTION, doc! { "_id": "n-1" })
        .await
        .unwrap();

    let err = session
        .insert_one(COLLECTION, doc! { "_id": "n-1" })
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::DuplicateKey { .. }));
}

#[tokio::test]
async fn natural_order_is_insertion_order() {
    let session = seeded_session().await;

    let documents = session
        .find(COLLECTION, Filter::all(), FindSpec::new())
        .await
        .unwrap();

    let ids: Vec<&str> = documents.iter().map(|d| d.get_str("_id").unwrap()).collect();
    assert_eq!(ids, vec!["n-1", "n-2", "n-3"]);
}

#[tokio::test]
async fn find_applies_sort_skip_and_limit() {
    let session = seeded_session().await;

    let documents = session
        .find(
            COLLECTION,
            Filter::all(),
            FindSpec::new().sort(vec![Sort::asc("rank")]).skip(1).limit(1),
        )
        .await
        .unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].get_str("_id").unwrap(), "n-3");
}

#[tokio::test]
async fn projection_keeps_the_primary_key() {
    let session = seeded_session().await;

    let documents = session
        .find(
            COLLECTION,
            Filter::eq("_id", "n-2"),
            FindSpec::new().projection(vec!["rank".into()]),
        )
        .await
        .unwrap();

    assert_eq!(documents, vec![doc! { "_id": "n-2", "rank": 1 }]);
}

#[tokio::test]
async fn count_sees_the_filter_only() {
    let session = seeded_session().await;

    let all = session
        .count_documents(COLLECTION, Filter::all())
        .await
        .unwrap();
    let high = session
        .count_documents(COLLECTION, Filter::gte("rank", 2))
        .await
        .unwrap();

    assert_eq!(all, 3);
    assert_eq!(high, 2);
}

#[tokio::test]
async fn replace_without_match_upserts_when_asked() {
    let session = InMemorySession::new();

    let missing = session
        .find_one_and_replace(
            COLLECTION,
            Filter::eq("_id", "n-9"),
            doc! { "_id": "n-9", "title": "new" },
            false,
        )
        .await
        .unwrap();
    assert_eq!(missing, None);

    let upserted = session
        .find_one_and_replace(
            COLLECTION,
            Filter::eq("_id", "n-9"),
            doc! { "_id": "n-9", "title": "new" },
            true,
        )
        .await
        .unwrap();
    assert_eq!(upserted, Some(doc! { "_id": "n-9", "title": "new" }));
}

#[tokio::test]
async fn replace_swaps_the_whole_document() {
    let session = seeded_session().await;

    let replaced = session
        .find_one_and_replace(
            COLLECTION,
            Filter::eq("_id", "n-1"),
            doc! { "_id": "n-1", "title": "only title" },
            true,
        )
        .await
        .unwrap()
        .unwrap();

    // the old fields are gone, not merged
    assert!(replaced.get("rank").is_none());
    assert_eq!(replaced.get_str("title").unwrap(), "only title");
}

#[tokio::test]
async fn update_merges_fields_into_the_match() {
    let session = seeded_session().await;

    let updated = session
        .find_one_and_update(
            COLLECTION,
            Filter::eq("_id", "n-2"),
            doc! { "rank": 9, "starred": true },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.get_i32("rank").unwrap(), 9);
    assert!(updated.get_bool("starred").unwrap());
    assert_eq!(updated.get_str("kind").unwrap(), "note");

    let missing = session
        .find_one_and_update(COLLECTION, Filter::eq("_id", "n-9"), doc! { "rank": 1 })
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn delete_returns_the_pre_image_once() {
    let session = seeded_session().await;

    let deleted = session
        .find_one_and_delete(COLLECTION, Filter::eq("_id", "n-3"))
        .await
        .unwrap();
    assert_eq!(
        deleted,
        Some(doc! { "_id": "n-3", "rank": 2, "kind": "note" })
    );

    let again = session
        .find_one_and_delete(COLLECTION, Filter::eq("_id", "n-3"))
        .await
        .unwrap();
    assert_eq!(again, None);
}

#[tokio::test]
async fn delete_many_reports_the_removed_count() {
    let session = seeded_session().await;

    let deleted = session
        .delete_many(COLLECTION, Filter::gte("rank", 2))
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let remaining = session
        .count_documents(COLLECTION, Filter::all())
        .await
        .unwrap();
    assert_eq!(remaining, 1);

    let none = session
        .delete_many("empty", Filter::all())
        .await
        .unwrap();
    assert_eq!(none, 0);
}
