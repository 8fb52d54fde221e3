//! Integration tests for the dataset store
//!
//! These exercise the public API end-to-end against in-memory and
//! file-backed stores.

use std::collections::BTreeMap;

use serde_json::{json, Value as JsonValue};
use tempfile::TempDir;
use uuid::Uuid;

use classet::{DatasetStore, SchemaVariant, StoreError};

const MBID_A: &str = "5465d03c-c767-4a51-9131-1b8d0c0de46b";
const MBID_B: &str = "3acb4a09-87af-4526-a3ac-a95876ee19c7";
const MBID_C: &str = "e16051bd-b892-4b96-a3a3-2cfc8cb73be8";
const MBID_D: &str = "0222ff68-4590-49b7-b063-c625e0f735ed";

/// Helper to build a dataset document from (class name, recordings) pairs
fn document(name: &str, classes: &[(&str, &[&str])]) -> JsonValue {
    let classes: Vec<JsonValue> = classes
        .iter()
        .map(|(class_name, recordings)| {
            json!({
                "name": class_name,
                "recordings": recordings,
            })
        })
        .collect();
    json!({
        "name": name,
        "public": true,
        "classes": classes,
    })
}

/// Collapse a fetched dataset's classes to a comparable name -> sorted
/// recordings map, ignoring generated ids and row order
fn class_map(store: &DatasetStore, id: Uuid) -> BTreeMap<String, Vec<String>> {
    let dataset = store.get(id).unwrap().expect("dataset exists");
    dataset
        .classes
        .into_iter()
        .map(|class| {
            let mut recordings = class.recordings;
            recordings.sort();
            (class.name, recordings)
        })
        .collect()
}

#[test]
fn create_then_get_round_trips() {
    let mut store = DatasetStore::open_in_memory().unwrap();

    let doc = json!({
        "name": "Mood",
        "description": "Aggressive vs calm",
        "public": false,
        "classes": [
            {"name": "Aggressive", "recordings": [MBID_A, MBID_B]},
            {"name": "Calm", "description": "slow tempo", "recordings": [MBID_C]},
        ],
    });

    let id = store.create(&doc, "user-1").unwrap();
    let dataset = store.get(id).unwrap().expect("dataset exists");

    assert_eq!(dataset.id, id);
    assert_eq!(dataset.name, "Mood");
    assert_eq!(dataset.description.as_deref(), Some("Aggressive vs calm"));
    assert!(!dataset.public);
    assert_eq!(dataset.author, "user-1");

    let classes = class_map(&store, id);
    assert_eq!(classes.len(), 2);
    let mut expected = vec![MBID_A.to_string(), MBID_B.to_string()];
    expected.sort();
    assert_eq!(classes["Aggressive"], expected);
    assert_eq!(classes["Calm"], vec![MBID_C.to_string()]);
}

#[test]
fn description_defaults_to_none() {
    let mut store = DatasetStore::open_in_memory().unwrap();

    let id = store
        .create(&document("No description", &[("a", &[MBID_A])]), "user-1")
        .unwrap();

    let dataset = store.get(id).unwrap().unwrap();
    assert_eq!(dataset.description, None);
    assert_eq!(dataset.classes[0].description, None);
}

#[test]
fn invalid_documents_are_rejected_and_nothing_persists() {
    let mut store = DatasetStore::open_in_memory().unwrap();

    let missing_name = json!({"public": true, "classes": []});
    let bad_public = json!({"name": "x", "public": "yes", "classes": []});
    let bad_mbid = json!({
        "name": "x",
        "public": true,
        "classes": [{"name": "a", "recordings": ["not-an-mbid"]}],
    });
    let missing_recordings = json!({
        "name": "x",
        "public": true,
        "classes": [{"name": "a"}],
    });

    for doc in [&missing_name, &bad_public, &bad_mbid, &missing_recordings] {
        let err = store.create(doc, "user-1").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "got {:?}", err);
    }

    let stats = store.statistics().unwrap();
    assert_eq!(stats.datasets, 0);
    assert_eq!(stats.classes, 0);
    assert_eq!(stats.members, 0);
    assert!(store.get_by_author("user-1", false).unwrap().is_empty());
}

#[test]
fn update_replaces_the_whole_class_tree() {
    let mut store = DatasetStore::open_in_memory().unwrap();

    let id = store
        .create(
            &document("Genres", &[("rock", &[MBID_A, MBID_B]), ("jazz", &[MBID_C])]),
            "user-1",
        )
        .unwrap();

    let replacement = document("Genres v2", &[("electronic", &[MBID_D])]);
    store.update(id, &replacement, "user-1").unwrap();

    let dataset = store.get(id).unwrap().unwrap();
    assert_eq!(dataset.name, "Genres v2");

    let classes = class_map(&store, id);
    assert_eq!(classes.len(), 1);
    assert_eq!(classes["electronic"], vec![MBID_D.to_string()]);

    // No member rows from the replaced classes may remain.
    let stats = store.statistics().unwrap();
    assert_eq!(stats.classes, 1);
    assert_eq!(stats.members, 1);
}

#[test]
fn update_keeps_identity_and_created_timestamp() {
    let mut store = DatasetStore::open_in_memory().unwrap();

    let id = store
        .create(&document("Before", &[("a", &[MBID_A])]), "user-1")
        .unwrap();
    let created = store.get(id).unwrap().unwrap().created;

    store
        .update(id, &document("After", &[("b", &[MBID_B])]), "user-2")
        .unwrap();

    let dataset = store.get(id).unwrap().unwrap();
    assert_eq!(dataset.id, id);
    assert_eq!(dataset.created, created);
    assert_eq!(dataset.author, "user-2");
}

#[test]
fn update_of_missing_dataset_is_not_found() {
    let mut store = DatasetStore::open_in_memory().unwrap();

    let err = store
        .update(
            Uuid::new_v4(),
            &document("ghost", &[("a", &[MBID_A])]),
            "user-1",
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    // The failed update must not leave class or member rows behind.
    let stats = store.statistics().unwrap();
    assert_eq!(stats.classes, 0);
    assert_eq!(stats.members, 0);
}

#[test]
fn invalid_update_leaves_prior_state_intact() {
    let mut store = DatasetStore::open_in_memory().unwrap();

    let id = store
        .create(&document("Stable", &[("a", &[MBID_A])]), "user-1")
        .unwrap();

    let invalid = json!({"name": "x", "public": true});
    let err = store.update(id, &invalid, "user-1").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let classes = class_map(&store, id);
    assert_eq!(classes["a"], vec![MBID_A.to_string()]);
}

#[test]
fn get_of_missing_dataset_is_none() {
    let store = DatasetStore::open_in_memory().unwrap();
    assert!(store.get(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn delete_is_idempotent_and_cascades() {
    let mut store = DatasetStore::open_in_memory().unwrap();

    let id = store
        .create(
            &document("Doomed", &[("a", &[MBID_A, MBID_B]), ("b", &[MBID_C])]),
            "user-1",
        )
        .unwrap();

    store.delete(id).unwrap();
    assert!(store.get(id).unwrap().is_none());

    // Classes and members went with the dataset.
    let stats = store.statistics().unwrap();
    assert_eq!(stats.datasets, 0);
    assert_eq!(stats.classes, 0);
    assert_eq!(stats.members, 0);

    // Deleting again is not an error.
    store.delete(id).unwrap();
}

#[test]
fn listing_respects_public_only() {
    let mut store = DatasetStore::open_in_memory().unwrap();

    let mut public_doc = document("Shared", &[("a", &[MBID_A])]);
    public_doc["public"] = json!(true);
    let mut private_doc = document("Hidden", &[("a", &[MBID_B])]);
    private_doc["public"] = json!(false);

    let public_id = store.create(&public_doc, "user-1").unwrap();
    let private_id = store.create(&private_doc, "user-1").unwrap();
    store
        .create(&document("Other", &[("a", &[MBID_C])]), "user-2")
        .unwrap();

    let public_only = store.get_by_author("user-1", true).unwrap();
    assert_eq!(public_only.len(), 1);
    assert_eq!(public_only[0].id, public_id);

    let all = store.get_by_author("user-1", false).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|summary| summary.id == private_id));
}

#[test]
fn complete_variant_gates_downstream_eligibility() {
    let store = DatasetStore::open_in_memory().unwrap();

    let one_class = document("small", &[("a", &[MBID_A, MBID_B])]);
    assert!(store.validate(&one_class, SchemaVariant::Base).is_ok());
    assert!(store.validate(&one_class, SchemaVariant::Complete).is_err());

    let thin_class = document("thin", &[("a", &[MBID_A, MBID_B]), ("b", &[MBID_C])]);
    assert!(store.validate(&thin_class, SchemaVariant::Base).is_ok());
    assert!(store.validate(&thin_class, SchemaVariant::Complete).is_err());

    let complete = document(
        "complete",
        &[("a", &[MBID_A, MBID_B]), ("b", &[MBID_C, MBID_D])],
    );
    assert!(store.validate(&complete, SchemaVariant::Base).is_ok());
    assert!(store.validate(&complete, SchemaVariant::Complete).is_ok());
}

#[test]
fn file_backed_store_persists_across_reopen() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("datasets.db");

    let id = {
        let mut store = DatasetStore::open(&db_path).unwrap();
        store
            .create(&document("Durable", &[("a", &[MBID_A])]), "user-1")
            .unwrap()
    };

    let store = DatasetStore::open(&db_path).unwrap();
    let dataset = store.get(id).unwrap().expect("dataset survives reopen");
    assert_eq!(dataset.name, "Durable");
    assert_eq!(dataset.classes.len(), 1);
}
