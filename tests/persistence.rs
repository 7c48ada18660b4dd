use std::sync::Arc;

use pixel_paint::document::{ArtworkId, ArtworkMeta, Progress, Snapshot};
use pixel_paint::engine::PaintEngine;
use pixel_paint::error::StorageError;
use pixel_paint::state::codec;
use pixel_paint::state::{
    FileStore, KeyValueStore, LEGACY_LIST_KEY, LIST_KEY, MIGRATED_KEY, MemoryStore,
    PersistenceStore, SaveReason, legacy_item_key, progress_key, snapshot_key,
};

fn create_board(id: &str) -> (ArtworkMeta, Snapshot, Progress) {
    let snapshot = Snapshot::new(
        3,
        2,
        vec![[20, 20, 20], [120, 60, 10], [250, 250, 250]],
        vec![0, 1, 2, 2, 1, 0],
    )
    .unwrap();
    let progress = Progress::fresh(&snapshot);
    let meta = ArtworkMeta {
        id: ArtworkId::new(id),
        title: format!("Board {id}"),
        created_at: 10,
        updated_at: 10,
        cols: 3,
        rows: 2,
        progress_percent: 0,
        thumbnail: Some("data:image/png;base64,old".to_owned()),
    };
    (meta, snapshot, progress)
}

fn painted(snapshot: &Snapshot, progress: &Progress, cells: &[usize]) -> Progress {
    let mut engine = PaintEngine::new(snapshot.clone(), progress.clone());
    for &cell in cells {
        let color = snapshot.label(cell).unwrap();
        engine.paint_cell(cell, color);
    }
    engine.progress().clone()
}

#[test]
fn test_save_then_load_roundtrip() {
    let store = PersistenceStore::new(MemoryStore::new());
    let (meta, snapshot, progress) = create_board("a");
    store.create_new(&meta, &snapshot, &progress).unwrap();

    let progress = painted(&snapshot, &progress, &[0, 5, 1]);
    store
        .save(&meta.id, &snapshot, &progress, "Renamed", 99, SaveReason::Manual)
        .unwrap();

    let loaded_snapshot = store.load_snapshot(&meta.id).unwrap();
    assert_eq!(loaded_snapshot, snapshot);
    let loaded_progress = store.load_progress(&meta.id, &loaded_snapshot).unwrap();
    assert_eq!(loaded_progress, progress);
    assert_eq!(loaded_progress.hidden_flags(), &[true, false, false]);

    let saved = store.meta(&meta.id).unwrap();
    assert_eq!(saved.title, "Renamed");
    assert_eq!(saved.updated_at, 99);
    assert_eq!(saved.created_at, 10);
    assert_eq!(saved.progress_percent, 50);
    assert_eq!(saved.thumbnail.as_deref(), Some("data:image/png;base64,old"));
}

#[test]
fn test_record_layout() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());
    let (meta, snapshot, progress) = create_board("b");
    store.create_new(&meta, &snapshot, &progress).unwrap();

    let snap: serde_json::Value =
        serde_json::from_str(&backend.get(&snapshot_key(&meta.id)).unwrap().unwrap()).unwrap();
    assert_eq!(snap["cols"], 3);
    assert_eq!(snap["palette"][1], serde_json::json!([120, 60, 10]));
    assert_eq!(
        codec::decode_bytes(snap["labelGrid_b64"].as_str().unwrap()).unwrap(),
        vec![0, 1, 2, 2, 1, 0]
    );

    let prog: serde_json::Value =
        serde_json::from_str(&backend.get(&progress_key(&meta.id)).unwrap().unwrap()).unwrap();
    assert_eq!(codec::decode_bytes(prog["mask_b64"].as_str().unwrap()).unwrap(), vec![0; 6]);
    assert_eq!(prog["counts"], serde_json::json!([2, 2, 2]));
    assert_eq!(prog["hidden"], serde_json::json!([0, 0, 0]));

    let list: serde_json::Value =
        serde_json::from_str(&backend.get(LIST_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(list[0]["id"], "b");
    assert_eq!(list[0]["createdAt"], 10);
    assert_eq!(list[0]["progress"], 0);
    assert!(list[0]["thumb"].is_string());
}

#[test]
fn test_list_is_most_recent_first_and_deduplicated() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());
    for id in ["one", "two"] {
        let (meta, snapshot, progress) = create_board(id);
        store.create_new(&meta, &snapshot, &progress).unwrap();
    }
    let ids: Vec<String> = store.list().iter().map(|m| m.id.to_string()).collect();
    assert_eq!(ids, vec!["two", "one"]);

    let (mut dup, _, _) = create_board("one");
    dup.title = "Shadowed".to_owned();
    let mut list = store.list();
    list.push(dup);
    backend.set(LIST_KEY, &serde_json::to_string(&list).unwrap()).unwrap();

    let list = store.list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].title, "Board one");
}

#[test]
fn test_thumbnail_refreshed_on_completion() {
    let store = PersistenceStore::new(MemoryStore::new());
    let (meta, snapshot, progress) = create_board("c");
    store.create_new(&meta, &snapshot, &progress).unwrap();

    let done = painted(&snapshot, &progress, &[0, 1, 2, 3, 4, 5]);
    let saved = store
        .save(&meta.id, &snapshot, &done, &meta.title, 50, SaveReason::Completed)
        .unwrap()
        .unwrap();
    assert_eq!(saved.progress_percent, 100);
    let thumb = saved.thumbnail.unwrap();
    assert!(thumb.starts_with("data:image/png;base64,"));
    assert_ne!(thumb, "data:image/png;base64,old");
}

#[test]
fn test_delete_removes_everything() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());
    let (meta, snapshot, progress) = create_board("gone");
    store.create_new(&meta, &snapshot, &progress).unwrap();
    store.delete(&meta.id).unwrap();

    assert!(store.list().is_empty());
    assert!(!backend.contains(&snapshot_key(&meta.id)));
    assert!(!backend.contains(&progress_key(&meta.id)));
    assert!(store.load_snapshot(&meta.id).is_none());
}

#[test]
fn test_malformed_records_read_as_absent() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());
    let id = ArtworkId::new("broken");
    backend.set(LIST_KEY, "{ not json").unwrap();
    backend.set(&snapshot_key(&id), r#"{"cols":2}"#).unwrap();

    assert!(store.list().is_empty());
    assert!(store.load_snapshot(&id).is_none());
}

#[test]
fn test_progress_with_wrong_mask_is_rejected() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());
    let (meta, snapshot, progress) = create_board("m");
    store.create_new(&meta, &snapshot, &progress).unwrap();

    let record = serde_json::json!({
        "mask_b64": codec::encode_bytes(&[0, 0, 0]),
        "counts": [2, 2, 2],
        "hidden": [0, 0, 0],
    });
    backend.set(&progress_key(&meta.id), &record.to_string()).unwrap();
    assert!(store.load_progress(&meta.id, &snapshot).is_none());
}

#[test]
fn test_failed_save_leaves_store_untouched() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());
    let (meta, snapshot, progress) = create_board("full");
    store.create_new(&meta, &snapshot, &progress).unwrap();
    let before = backend.get(&progress_key(&meta.id)).unwrap();

    backend.set_quota(Some(backend.used_bytes() - 1));
    let progress = painted(&snapshot, &progress, &[0]);
    let err = store
        .save(&meta.id, &snapshot, &progress, "x", 1, SaveReason::Autosave)
        .unwrap_err();
    assert!(matches!(err, StorageError::QuotaExceeded { .. }));
    assert_eq!(backend.get(&progress_key(&meta.id)).unwrap(), before);
    assert_eq!(store.meta(&meta.id).unwrap().progress_percent, 0);
}

#[test]
fn test_stale_counts_are_rebuilt_from_mask() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());
    let (meta, snapshot, progress) = create_board("stale");
    store.create_new(&meta, &snapshot, &progress).unwrap();

    // Right lengths, wrong values: color 0 claims one cell left and color 2 none
    let record = serde_json::json!({
        "mask_b64": codec::encode_bytes(&[0; 6]),
        "counts": [1, 2, 0],
        "hidden": [0, 0, 1],
    });
    backend.set(&progress_key(&meta.id), &record.to_string()).unwrap();

    let loaded = store.load_progress(&meta.id, &snapshot).unwrap();
    assert_eq!(loaded.remaining_counts(), &[2, 2, 2]);
    assert_eq!(loaded.hidden_flags(), &[false, false, false]);

    let mut engine = PaintEngine::new(snapshot.clone(), loaded);
    engine.paint_cell(0, 0);
    assert!(!engine.progress().is_hidden(0));
    assert_eq!(engine.selected(), 0);
    assert_eq!(engine.select(2), Some((0, 2)));
}

#[test]
fn test_save_of_unknown_id_writes_nothing() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());
    let (meta, snapshot, progress) = create_board("known");
    store.create_new(&meta, &snapshot, &progress).unwrap();
    let list_before = backend.get(LIST_KEY).unwrap();

    let stranger = ArtworkId::new("stranger");
    let saved = store
        .save(&stranger, &snapshot, &progress, "Ghost", 7, SaveReason::Autosave)
        .unwrap();
    assert!(saved.is_none());
    assert!(!backend.contains(&progress_key(&stranger)));
    assert_eq!(backend.get(LIST_KEY).unwrap(), list_before);
}

fn write_legacy_item(backend: &MemoryStore, id: &str, title: Option<&str>) {
    let mut item = serde_json::json!({
        "cols": 2,
        "rows": 2,
        "palette": [[0, 0, 0], [255, 255, 255]],
        "kIdx": codec::encode_bytes(&[0, 1, 1, 0]),
        "mask": codec::encode_bytes(&[1, 0, 0, 0]),
    });
    if let Some(title) = title {
        item["title"] = title.into();
    }
    backend.set(&legacy_item_key(id), &item.to_string()).unwrap();
}

#[test]
fn test_legacy_migration_runs_once() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());

    let (meta, snapshot, progress) = create_board("already");
    store.create_new(&meta, &snapshot, &progress).unwrap();

    let legacy_list = serde_json::json!([
        { "id": "old1", "title": "From list", "createdAt": 5, "progress": 25 },
        { "id": "old2" },
        { "id": "missing" },
        { "id": "already" },
    ]);
    backend.set(LEGACY_LIST_KEY, &legacy_list.to_string()).unwrap();
    write_legacy_item(&backend, "old1", None);
    write_legacy_item(&backend, "already", Some("ignored"));
    backend.set(&legacy_item_key("old2"), r#"{"cols":2,"rows":2,"palette":[[0,0,0]],"kIdx":"%%%","mask":""}"#).unwrap();

    let report = store.migrate_legacy(1_000).unwrap();
    assert!(report.ran);
    assert_eq!(report.migrated, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(backend.get(MIGRATED_KEY).unwrap().as_deref(), Some("1"));

    let old = ArtworkId::new("old1");
    let migrated = store.meta(&old).unwrap();
    assert_eq!(migrated.title, "From list");
    assert_eq!(migrated.created_at, 5);
    assert_eq!(migrated.updated_at, 1_000);
    assert_eq!(migrated.progress_percent, 25);
    assert_eq!(store.meta(&meta.id).unwrap().title, "Board already");

    // Counts were absent in the legacy item and get rebuilt from the mask
    let snapshot = store.load_snapshot(&old).unwrap();
    let progress = store.load_progress(&old, &snapshot).unwrap();
    assert_eq!(progress.remaining_counts(), &[1, 2]);
    assert_eq!(progress.fill_mask(), &[true, false, false, false]);

    let again = store.migrate_legacy(2_000).unwrap();
    assert!(!again.ran);
    assert_eq!(store.list().len(), 2);
}

#[test]
fn test_migration_without_legacy_data_is_noop() {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistenceStore::new(backend.clone());
    let report = store.migrate_legacy(0).unwrap();
    assert!(!report.ran);
    assert!(!backend.contains(MIGRATED_KEY));
}

#[test]
fn test_file_store_roundtrip() {
    let dir = std::env::temp_dir().join(format!("pixel-paint-{}", uuid::Uuid::new_v4().simple()));
    let store = PersistenceStore::new(FileStore::new(&dir).unwrap());
    let (meta, snapshot, progress) = create_board("disk");
    store.create_new(&meta, &snapshot, &progress).unwrap();

    let reopened = PersistenceStore::new(FileStore::new(&dir).unwrap());
    assert_eq!(reopened.list().len(), 1);
    assert_eq!(reopened.load_snapshot(&meta.id).unwrap(), snapshot);
    reopened.delete(&meta.id).unwrap();
    assert!(reopened.list().is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}
