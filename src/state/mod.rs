mod autosave;
pub mod codec;
mod persistence;
mod records;
mod storage;
mod studio;

pub use autosave::{AutosaveScheduler, SessionToken};
pub use persistence::{
    LEGACY_LIST_KEY, LIST_KEY, MIGRATED_KEY, MigrationReport, PersistenceStore, SaveReason,
    legacy_item_key, progress_key, snapshot_key,
};
pub use records::{LegacyEntry, LegacyItem, ProgressRecord, SnapshotRecord};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use studio::{SaveStatus, Studio, View};
