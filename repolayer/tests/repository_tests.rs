use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use repolayer::memory::InMemorySession;
use repolayer::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Contact {
    id: Option<String>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    created_at: DateTime<Utc>,
}

impl Entity for Contact {
    type Id = String;

    fn id(&self) -> Option<&String> {
        self.id.as_ref()
    }

    fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    fn collection_name() -> &'static str {
        "contacts"
    }
}

/// Deterministic identifiers so assertions can name exact documents.
#[derive(Debug, Default)]
struct SeqIds(AtomicU64);

impl IdGenerator<String> for SeqIds {
    fn next_id(&self) -> String {
        format!("contact-{}", self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Typed filter parameters, the way a domain repository would define them.
struct ByName(&'static str);

impl IntoFilter for ByName {
    fn into_filter(self) -> Filter {
        Filter::eq("name", self.0)
    }
}

fn contact(name: &str) -> Contact {
    Contact {
        id: None,
        name: name.to_string(),
        tag: None,
        created_at: Utc::now(),
    }
}

fn tagged(name: &str, tag: &str) -> Contact {
    Contact {
        tag: Some(tag.to_string()),
        ..contact(name)
    }
}

fn make_repository() -> Repository<InMemorySession, Contact> {
    Repository::new(InMemorySession::new(), Arc::new(SeqIds::default()))
}

async fn seed(repository: &Repository<InMemorySession, Contact>, names: &[&str]) -> Vec<Contact> {
    let mut created = Vec::new();
    for name in names {
        created.push(
            repository
                .create("seed", Some(contact(name)))
                .await
                .unwrap()
                .unwrap(),
        );
    }
    created
}

// ── Create ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_generates_unique_ids_when_absent() {
    let repository = make_repository();

    let first = repository
        .create("req", Some(contact("Ann")))
        .await
        .unwrap()
        .unwrap();
    let second = repository
        .create("req", Some(contact("Ben")))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.id.as_deref(), Some("contact-1"));
    assert_eq!(second.id.as_deref(), Some("contact-2"));
}

#[tokio::test]
async fn create_preserves_a_supplied_id_verbatim() {
    let repository = make_repository();

    let created = repository
        .create("req", Some(contact("Ann").with_id("my-own-id".to_string())))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("my-own-id"));
}

#[tokio::test]
async fn create_of_nothing_is_a_silent_no_op() {
    let repository = make_repository();

    let result = repository.create("req", None).await.unwrap();

    assert_eq!(result, None);
}

#[tokio::test]
async fn create_surfaces_duplicate_identifiers() {
    let repository = make_repository();
    let item = contact("Ann").with_id("dup".to_string());

    repository.create("req", Some(item.clone())).await.unwrap();
    let err = repository.create("req", Some(item)).await.unwrap_err();

    assert!(matches!(err, RepositoryError::DuplicateKey { .. }));
}

// ── Lookups ──────────────────────────────────────────────────────

#[tokio::test]
async fn get_one_by_id_is_absent_not_an_error() {
    let repository = make_repository();
    let created = seed(&repository, &["Ann"]).await.remove(0);

    let found = repository
        .get_one_by_id("req", created.id.as_ref().unwrap())
        .await
        .unwrap();
    assert_eq!(found, Some(created));

    let missing = repository
        .get_one_by_id("req", &"no-such-id".to_string())
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn get_list_by_ids_filters_on_membership() {
    let repository = make_repository();
    let created = seed(&repository, &["Ann", "Ben", "Cas"]).await;

    let ids = vec![
        created[0].id.clone().unwrap(),
        created[2].id.clone().unwrap(),
    ];
    let listed = repository.get_list_by_ids("req", &ids).await.unwrap();

    assert_eq!(listed, vec![created[0].clone(), created[2].clone()]);
}

#[tokio::test]
async fn get_list_is_unbounded_and_sortable() {
    let repository = make_repository();
    seed(&repository, &["Cas", "Ann", "Ben"]).await;

    let listed = repository
        .get_list("req", Filter::all(), vec![Sort::asc("name")], vec![])
        .await
        .unwrap();

    let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Ben", "Cas"]);
}

#[tokio::test]
async fn get_one_random_draws_from_the_filtered_set() {
    let repository = make_repository();
    seed(&repository, &["Ann", "Ann", "Ben"]).await;

    let drawn = repository
        .get_one_random("req", Filter::eq("name", "Ann"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(drawn.name, "Ann");

    let none = repository
        .get_one_random("req", Filter::eq("name", "Zed"))
        .await
        .unwrap();
    assert_eq!(none, None);
}

// ── Paging ───────────────────────────────────────────────────────

#[tokio::test]
async fn page_data_is_bounded_by_take() {
    let repository = make_repository();
    seed(&repository, &["a", "b", "c", "d", "e"]).await;

    let page = repository
        .get_page("req", Filter::all(), PageRequest::new().take(2), vec![], vec![])
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.total, None);
}

#[tokio::test]
async fn total_is_counted_only_when_wanted() {
    let repository = make_repository();
    seed(&repository, &["a", "b", "c", "d", "e"]).await;

    let page = repository
        .get_page(
            "req",
            Filter::all(),
            PageRequest::new().take(2).with_total(),
            vec![],
            vec![],
        )
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.total, Some(5));
    assert!(page.total.unwrap() >= page.data.len() as u64);
}

#[tokio::test]
async fn negative_skip_behaves_like_no_skip() {
    let repository = make_repository();
    seed(&repository, &["a", "b", "c"]).await;

    let without = repository
        .get_page("req", Filter::all(), PageRequest::new().take(2), vec![], vec![])
        .await
        .unwrap();
    let negative = repository
        .get_page(
            "req",
            Filter::all(),
            PageRequest::new().skip(-7).take(2),
            vec![],
            vec![],
        )
        .await
        .unwrap();

    assert_eq!(negative, without);
}

#[tokio::test]
async fn take_never_exceeds_the_configured_maximum() {
    let repository = make_repository().with_config(RepositoryConfig::with_max_page_size(3));
    seed(&repository, &["a", "b", "c", "d", "e"]).await;

    let oversized = repository
        .get_page("req", Filter::all(), PageRequest::new().take(50), vec![], vec![])
        .await
        .unwrap();
    assert_eq!(oversized.data.len(), 3);

    // absent take defaults to the maximum as well
    let defaulted = repository
        .get_page("req", Filter::all(), PageRequest::new(), vec![], vec![])
        .await
        .unwrap();
    assert_eq!(defaulted.data.len(), 3);
}

#[tokio::test]
async fn skip_advances_through_the_result_set() {
    let repository = make_repository();
    let created = seed(&repository, &["a", "b", "c", "d"]).await;

    let page = repository
        .get_page(
            "req",
            Filter::all(),
            PageRequest::new().skip(2).take(10),
            vec![],
            vec![],
        )
        .await
        .unwrap();

    assert_eq!(page.data, vec![created[2].clone(), created[3].clone()]);
}

// ── Set / update semantics ───────────────────────────────────────

#[tokio::test]
async fn set_inserts_when_the_id_is_new() {
    let repository = make_repository();

    let stored = repository
        .set("req", Some(contact("Ann").with_id("a-1".to_string())))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stored.id.as_deref(), Some("a-1"));
    assert_eq!(
        repository.get_one_by_id("req", &"a-1".to_string()).await.unwrap(),
        Some(stored)
    );
}

#[tokio::test]
async fn set_replaces_fully_so_omitted_fields_vanish() {
    let repository = make_repository();
    let created = repository
        .create("req", Some(tagged("Ann", "friend")))
        .await
        .unwrap()
        .unwrap();

    let replacement = Contact {
        tag: None,
        ..created.clone()
    };
    let stored = repository.set("req", Some(replacement)).await.unwrap().unwrap();

    assert_eq!(stored.tag, None);
    let reread = repository
        .get_one_by_id("req", created.id.as_ref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reread.tag, None);
}

#[tokio::test]
async fn set_of_nothing_is_a_silent_no_op() {
    let repository = make_repository();

    assert_eq!(repository.set("req", None).await.unwrap(), None);
}

#[tokio::test]
async fn update_merges_and_leaves_absent_fields_untouched() {
    let repository = make_repository();
    let created = repository
        .create("req", Some(tagged("Ann", "friend")))
        .await
        .unwrap()
        .unwrap();

    // tag is None, so it is omitted from the update and survives the merge
    let updated = repository
        .update(
            "req",
            Some(Contact {
                name: "Anne".to_string(),
                tag: None,
                ..created.clone()
            }),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Anne");
    assert_eq!(updated.tag.as_deref(), Some("friend"));
}

#[tokio::test]
async fn update_without_an_id_is_a_silent_no_op() {
    let repository = make_repository();
    seed(&repository, &["Ann"]).await;

    assert_eq!(repository.update("req", None).await.unwrap(), None);
    assert_eq!(
        repository.update("req", Some(contact("Ann"))).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn update_of_a_missing_document_is_absent() {
    let repository = make_repository();

    let result = repository
        .update("req", Some(contact("Ann").with_id("ghost".to_string())))
        .await
        .unwrap();

    assert_eq!(result, None);
}

#[tokio::test]
async fn update_partially_touches_only_the_named_fields() {
    let repository = make_repository();
    let created = repository
        .create("req", Some(tagged("Ann", "friend")))
        .await
        .unwrap()
        .unwrap();

    let updated = repository
        .update_partially(
            "req",
            created.id.clone(),
            Some(bson::doc! { "name": "XYZ" }),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "XYZ");
    assert_eq!(updated.tag.as_deref(), Some("friend"));
}

#[tokio::test]
async fn update_partially_guards_degenerate_inputs() {
    let repository = make_repository();
    let created = seed(&repository, &["Ann"]).await.remove(0);

    let no_id = repository
        .update_partially("req", None, Some(bson::doc! { "name": "X" }))
        .await
        .unwrap();
    assert_eq!(no_id, None);

    let no_fields = repository
        .update_partially("req", created.id.clone(), None)
        .await
        .unwrap();
    assert_eq!(no_fields, None);

    // a map holding only the identifier reduces to nothing settable
    let id_only = repository
        .update_partially(
            "req",
            created.id.clone(),
            Some(bson::doc! { "id": "other" }),
        )
        .await
        .unwrap();
    assert_eq!(id_only, None);
}

// ── Deletion ─────────────────────────────────────────────────────

#[tokio::test]
async fn delete_by_id_returns_the_entity_once() {
    let repository = make_repository();
    let created = seed(&repository, &["Ann"]).await.remove(0);
    let id = created.id.clone().unwrap();

    let first = repository.delete_by_id("req", &id).await.unwrap();
    assert_eq!(first, Some(created));

    let second = repository.delete_by_id("req", &id).await.unwrap();
    assert_eq!(second, None);
}

#[tokio::test]
async fn delete_by_filter_reports_the_count_only() {
    let repository = make_repository();
    seed(&repository, &["Ann", "Ann", "Ben"]).await;

    let deleted = repository
        .delete_by_filter("req", Filter::eq("name", "Ann"))
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let remaining = repository
        .get_list("req", Filter::all(), vec![], vec![])
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
}

#[tokio::test]
async fn delete_by_ids_is_membership_sugar() {
    let repository = make_repository();
    let created = seed(&repository, &["Ann", "Ben", "Cas"]).await;

    let ids = vec![
        created[0].id.clone().unwrap(),
        created[1].id.clone().unwrap(),
        "no-such-id".to_string(),
    ];
    let deleted = repository.delete_by_ids("req", &ids).await.unwrap();

    assert_eq!(deleted, 2);
}

// ── End to end ───────────────────────────────────────────────────

#[tokio::test]
async fn created_entities_are_pageable_and_deletable() {
    let repository = make_repository();

    let created = repository
        .create("req", Some(contact("ABC")))
        .await
        .unwrap()
        .unwrap();
    assert!(created.id.is_some());

    let page = repository
        .get_page_by(
            "req",
            ByName("ABC"),
            PageRequest::new().with_total(),
            vec![],
            vec![],
        )
        .await
        .unwrap();
    assert_eq!(page.data, vec![created.clone()]);
    assert_eq!(page.total, Some(1));

    let deleted = repository
        .delete_by_id("req", created.id.as_ref().unwrap())
        .await
        .unwrap();
    assert_eq!(deleted, Some(created.clone()));

    let gone = repository
        .get_one_by_id("req", created.id.as_ref().unwrap())
        .await
        .unwrap();
    assert_eq!(gone, None);
}
