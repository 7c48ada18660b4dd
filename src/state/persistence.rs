use std::collections::HashSet;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::records::{LegacyEntry, LegacyItem, ProgressRecord, SnapshotRecord};
use super::storage::KeyValueStore;
use crate::document::{ArtworkId, ArtworkMeta, Progress, Snapshot};
use crate::error::{StorageError, StorageResult};
use crate::export;

pub const LIST_KEY: &str = "ppg:v2:list";
pub const MIGRATED_KEY: &str = "ppg:v2:migrated";
pub const LEGACY_LIST_KEY: &str = "ppg:gallery";

pub fn snapshot_key(id: &ArtworkId) -> String {
    format!("ppg:v2:{id}:snap")
}

pub fn progress_key(id: &ArtworkId) -> String {
    format!("ppg:v2:{id}:prog")
}

pub fn legacy_item_key(id: &str) -> String {
    format!("ppg:item:{id}")
}

/// Why a save was requested; only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReason {
    Autosave,
    Manual,
    Completed,
    Switch,
    Generate,
    Close,
}

/// Outcome of the one-time legacy import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// False if the flag was already set or there was nothing to import
    pub ran: bool,
    pub migrated: usize,
    pub skipped: usize,
}

/// Reads and writes artworks on top of a [`KeyValueStore`].
///
/// Each artwork is stored as a gallery entry in the shared list plus a
/// snapshot record and a progress record under its own keys.
#[derive(Debug)]
pub struct PersistenceStore<S> {
    store: S,
    thumbnail_width: u32,
}

impl<S: KeyValueStore> PersistenceStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            thumbnail_width: 256,
        }
    }

    pub fn with_thumbnail_width(mut self, width: u32) -> Self {
        self.thumbnail_width = width;
        self
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Gallery, most recent first. Unreadable lists read as empty.
    pub fn list(&self) -> Vec<ArtworkMeta> {
        match self.read_json::<Vec<ArtworkMeta>>(LIST_KEY) {
            Ok(Some(list)) => dedupe(list),
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!("Ignoring unreadable gallery list: {}", err);
                Vec::new()
            }
        }
    }

    pub fn meta(&self, id: &ArtworkId) -> Option<ArtworkMeta> {
        self.list().into_iter().find(|m| &m.id == id)
    }

    pub fn load_snapshot(&self, id: &ArtworkId) -> Option<Snapshot> {
        let key = snapshot_key(id);
        let record = match self.read_json::<SnapshotRecord>(&key) {
            Ok(record) => record?,
            Err(err) => {
                log::warn!("Ignoring snapshot `{}`: {}", key, err);
                return None;
            }
        };
        record
            .into_snapshot(&key)
            .map_err(|err| log::warn!("Ignoring snapshot `{}`: {}", key, err))
            .ok()
    }

    /// Progress for `id`, checked against its snapshot.
    pub fn load_progress(&self, id: &ArtworkId, snapshot: &Snapshot) -> Option<Progress> {
        let key = progress_key(id);
        let record = match self.read_json::<ProgressRecord>(&key) {
            Ok(record) => record?,
            Err(err) => {
                log::warn!("Ignoring progress `{}`: {}", key, err);
                return None;
            }
        };
        record
            .into_progress(snapshot, &key)
            .map_err(|err| log::warn!("Ignoring progress `{}`: {}", key, err))
            .ok()
    }

    /// Registers a new artwork. The records are written before the gallery
    /// entry that points at them.
    pub fn create_new(
        &self,
        meta: &ArtworkMeta,
        snapshot: &Snapshot,
        progress: &Progress,
    ) -> StorageResult<()> {
        self.write_json(&snapshot_key(&meta.id), &SnapshotRecord::from_snapshot(snapshot))?;
        self.write_json(&progress_key(&meta.id), &ProgressRecord::from_progress(progress))?;
        let mut list = self.list();
        list.insert(0, meta.clone());
        self.write_list(list)
    }

    /// Persists progress for `id` and refreshes its gallery entry.
    ///
    /// The thumbnail is only re-rendered once the board is complete. Returns
    /// the updated entry, or `None` without writing anything if `id` is not
    /// in the gallery.
    pub fn save(
        &self,
        id: &ArtworkId,
        snapshot: &Snapshot,
        progress: &Progress,
        title: &str,
        now: u64,
        reason: SaveReason,
    ) -> StorageResult<Option<ArtworkMeta>> {
        let mut list = self.list();
        let Some(meta) = list.iter_mut().find(|m| &m.id == id) else {
            log::warn!("Not saving `{}` ({:?}): it is not in the gallery", id, reason);
            return Ok(None);
        };

        let percent = progress.percent();
        log::debug!("Saving `{}` ({:?}, {}%)", id, reason, percent);
        meta.title = title.to_owned();
        meta.progress_percent = percent;
        meta.updated_at = now;
        if percent == 100 {
            match export::thumbnail_data_url(snapshot, progress, self.thumbnail_width) {
                Ok(url) => meta.thumbnail = Some(url),
                Err(err) => log::warn!("Keeping old thumbnail for `{}`: {}", id, err),
            }
        }
        let updated = meta.clone();

        self.write_json(&progress_key(id), &ProgressRecord::from_progress(progress))?;
        self.write_list(list)?;
        Ok(Some(updated))
    }

    pub fn delete(&self, id: &ArtworkId) -> StorageResult<()> {
        self.store.remove(&snapshot_key(id))?;
        self.store.remove(&progress_key(id))?;
        let list: Vec<ArtworkMeta> = self.list().into_iter().filter(|m| &m.id != id).collect();
        self.write_list(list)?;
        log::info!("Deleted artwork `{}`", id);
        Ok(())
    }

    /// Imports boards saved in the legacy single-record schema, once.
    ///
    /// Items that fail to read or convert are skipped. The flag is written
    /// whenever a legacy list was found, even if some items failed.
    pub fn migrate_legacy(&self, now: u64) -> StorageResult<MigrationReport> {
        if self.store.get(MIGRATED_KEY)?.is_some() {
            return Ok(MigrationReport::default());
        }
        let Some(legacy_list) = self.store.get(LEGACY_LIST_KEY)? else {
            return Ok(MigrationReport::default());
        };

        let mut report = MigrationReport {
            ran: true,
            ..Default::default()
        };
        let result = self.import_legacy(&legacy_list, now, &mut report);
        self.store.set(MIGRATED_KEY, "1")?;
        result?;

        log::info!(
            "Legacy migration finished: {} imported, {} skipped",
            report.migrated,
            report.skipped
        );
        Ok(report)
    }

    fn import_legacy(
        &self,
        legacy_list: &str,
        now: u64,
        report: &mut MigrationReport,
    ) -> StorageResult<()> {
        let entries: Vec<LegacyEntry> = match serde_json::from_str(legacy_list) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Legacy gallery list is unreadable: {}", err);
                return Ok(());
            }
        };
        let existing: HashSet<ArtworkId> = self.list().into_iter().map(|m| m.id).collect();

        for entry in entries {
            let id = ArtworkId::new(entry.id.clone());
            if entry.id.is_empty() || existing.contains(&id) {
                continue;
            }
            match self.import_item(&id, entry, now) {
                Ok(()) => report.migrated += 1,
                Err(err) => {
                    log::warn!("Skipping legacy item `{}`: {}", id, err);
                    report.skipped += 1;
                }
            }
        }
        Ok(())
    }

    fn import_item(&self, id: &ArtworkId, entry: LegacyEntry, now: u64) -> StorageResult<()> {
        let key = legacy_item_key(id.as_str());
        let item: LegacyItem = self.read_json(&key)?.ok_or_else(|| StorageError::InvalidRecord {
            key: key.clone(),
            reason: "missing".to_owned(),
        })?;
        let item_title = item.title.clone().filter(|t| !t.is_empty());
        let (snap_record, prog_record) = item.into_records();
        let snapshot = snap_record.into_snapshot(&key)?;
        let progress = prog_record.into_progress(&snapshot, &key)?;

        let meta = ArtworkMeta {
            id: id.clone(),
            title: item_title.or(entry.title).unwrap_or_default(),
            created_at: entry.created_at.unwrap_or(now),
            updated_at: entry.updated_at.unwrap_or(now),
            cols: snapshot.cols(),
            rows: snapshot.rows(),
            progress_percent: entry.progress.unwrap_or(0),
            thumbnail: entry.thumb,
        };
        self.create_new(&meta, &snapshot, &progress)
    }

    fn write_list(&self, list: Vec<ArtworkMeta>) -> StorageResult<()> {
        self.write_json(LIST_KEY, &dedupe(list))
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.store.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }
}

/// Keeps the first entry for every id.
fn dedupe(list: Vec<ArtworkMeta>) -> Vec<ArtworkMeta> {
    let mut seen = HashSet::new();
    list.into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}
