//! JSON shapes of the stored records.

use serde::{Deserialize, Serialize};

use super::codec;
use crate::color::Rgb;
use crate::document::{Progress, Snapshot};
use crate::error::StorageError;

/// Stored puzzle definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub cols: u32,
    pub rows: u32,
    pub palette: Vec<Rgb>,
    #[serde(rename = "labelGrid_b64", alias = "kIdx_b64")]
    pub label_grid_b64: String,
}

impl SnapshotRecord {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            cols: snapshot.cols(),
            rows: snapshot.rows(),
            palette: snapshot.palette().to_vec(),
            label_grid_b64: codec::encode_bytes(snapshot.label_grid()),
        }
    }

    pub fn into_snapshot(self, key: &str) -> Result<Snapshot, StorageError> {
        let labels = codec::decode_bytes(&self.label_grid_b64).map_err(|e| invalid(key, e))?;
        Snapshot::new(self.cols, self.rows, self.palette, labels).map_err(|e| invalid(key, e))
    }
}

/// Stored fill state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub mask_b64: String,
    #[serde(default)]
    pub counts: Vec<u32>,
    /// 0/1 per color
    #[serde(default)]
    pub hidden: Vec<u8>,
}

impl ProgressRecord {
    pub fn from_progress(progress: &Progress) -> Self {
        Self {
            mask_b64: codec::encode_mask(progress.fill_mask()),
            counts: progress.remaining_counts().to_vec(),
            hidden: progress.hidden_flags().iter().map(|&h| h as u8).collect(),
        }
    }

    pub fn into_progress(self, snapshot: &Snapshot, key: &str) -> Result<Progress, StorageError> {
        let mask = codec::decode_mask(&self.mask_b64).map_err(|e| invalid(key, e))?;
        let hidden = self.hidden.iter().map(|&h| h != 0).collect();
        Progress::restore(snapshot, mask, self.counts, hidden).map_err(|e| invalid(key, e))
    }
}

/// Gallery entry of the legacy schema; every field but the id may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyEntry {
    pub id: String,
    pub title: Option<String>,
    pub created_at: Option<u64>,
    pub updated_at: Option<u64>,
    pub progress: Option<u8>,
    pub thumb: Option<String>,
}

/// One board of the legacy schema, stored whole in a single record.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyItem {
    pub cols: u32,
    pub rows: u32,
    pub palette: Vec<Rgb>,
    #[serde(rename = "kIdx")]
    pub labels_b64: String,
    #[serde(rename = "mask")]
    pub mask_b64: String,
    #[serde(default)]
    pub counts: Vec<u32>,
    #[serde(default)]
    pub hidden: Vec<u8>,
    #[serde(default)]
    pub title: Option<String>,
}

impl LegacyItem {
    /// Splits the item into the current record pair.
    pub fn into_records(self) -> (SnapshotRecord, ProgressRecord) {
        (
            SnapshotRecord {
                cols: self.cols,
                rows: self.rows,
                palette: self.palette,
                label_grid_b64: self.labels_b64,
            },
            ProgressRecord {
                mask_b64: self.mask_b64,
                counts: self.counts,
                hidden: self.hidden,
            },
        )
    }
}

fn invalid(key: &str, reason: impl ToString) -> StorageError {
    StorageError::InvalidRecord {
        key: key.to_owned(),
        reason: reason.to_string(),
    }
}
