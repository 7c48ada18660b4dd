//! The puzzle model: an immutable [`Snapshot`] describing the board and the
//! mutable [`Progress`] a player makes on it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::DocumentError;

/// Identifier of a saved artwork.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkId(String);

impl ArtworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gallery entry for one artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkMeta {
    pub id: ArtworkId,
    #[serde(default)]
    pub title: String,
    /// Milliseconds since the UNIX epoch
    pub created_at: u64,
    pub updated_at: u64,
    pub cols: u32,
    pub rows: u32,
    /// Completion in whole percent
    #[serde(rename = "progress", default)]
    pub progress_percent: u8,
    /// PNG data URL
    #[serde(rename = "thumb", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Immutable definition of a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    cols: u32,
    rows: u32,
    palette: Vec<Rgb>,
    label_grid: Vec<u8>,
}

impl Snapshot {
    /// Validates the shape invariants and builds a snapshot.
    pub fn new(
        cols: u32,
        rows: u32,
        palette: Vec<Rgb>,
        label_grid: Vec<u8>,
    ) -> Result<Self, DocumentError> {
        if cols == 0 || rows == 0 {
            return Err(DocumentError::EmptyGrid { cols, rows });
        }
        if palette.is_empty() || palette.len() > 256 {
            return Err(DocumentError::PaletteSize(palette.len()));
        }
        let expected = cols as usize * rows as usize;
        if label_grid.len() != expected {
            return Err(DocumentError::LabelGridSize {
                expected,
                actual: label_grid.len(),
            });
        }
        if let Some((index, &label)) = label_grid
            .iter()
            .enumerate()
            .find(|(_, l)| **l as usize >= palette.len())
        {
            return Err(DocumentError::LabelOutOfRange {
                index,
                label,
                palette_len: palette.len(),
            });
        }
        Ok(Self {
            cols,
            rows,
            palette,
            label_grid,
        })
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_count(&self) -> usize {
        self.label_grid.len()
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// Number of colors (K)
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    pub fn label_grid(&self) -> &[u8] {
        &self.label_grid
    }

    /// Correct color of a cell, `None` when out of range
    pub fn label(&self, index: usize) -> Option<usize> {
        self.label_grid.get(index).map(|&l| l as usize)
    }

    /// Cell index for a column/row pair inside the grid
    pub fn index_of(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.cols as i64 || y >= self.rows as i64 {
            return None;
        }
        Some(y as usize * self.cols as usize + x as usize)
    }

    /// Column/row of a cell index
    pub fn coords_of(&self, index: usize) -> (i64, i64) {
        let cols = self.cols as usize;
        ((index % cols) as i64, (index / cols) as i64)
    }

    /// Total number of cells per color
    pub fn color_totals(&self) -> Vec<u32> {
        let mut totals = vec![0u32; self.palette.len()];
        for &label in &self.label_grid {
            totals[label as usize] += 1;
        }
        totals
    }
}

/// Mutable fill state for one snapshot.
///
/// The three arrays are sized once from the snapshot and never resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    fill_mask: Vec<bool>,
    remaining: Vec<u32>,
    hidden: Vec<bool>,
}

impl Progress {
    /// Progress for a board nobody has touched yet.
    pub fn fresh(snapshot: &Snapshot) -> Self {
        let remaining = snapshot.color_totals();
        let hidden = remaining.iter().map(|&c| c == 0).collect();
        Self {
            fill_mask: vec![false; snapshot.cell_count()],
            remaining,
            hidden,
        }
    }

    /// Restores stored progress, checking it against the snapshot.
    ///
    /// A mask of the wrong size is rejected. Counts and hidden flags are
    /// always derived from the mask; stored values that disagree are logged
    /// and replaced.
    pub fn restore(
        snapshot: &Snapshot,
        fill_mask: Vec<bool>,
        remaining: Vec<u32>,
        hidden: Vec<bool>,
    ) -> Result<Self, DocumentError> {
        if fill_mask.len() != snapshot.cell_count() {
            return Err(DocumentError::MaskSize {
                expected: snapshot.cell_count(),
                actual: fill_mask.len(),
            });
        }
        let mut progress = Self {
            fill_mask,
            remaining: Vec::new(),
            hidden: Vec::new(),
        };
        progress.recount(snapshot);
        if progress.remaining != remaining || progress.hidden != hidden {
            log::warn!(
                "Stored counts {:?} / hidden {:?} disagree with the fill mask, using {:?} / {:?}",
                remaining,
                hidden,
                progress.remaining,
                progress.hidden
            );
        }
        Ok(progress)
    }

    /// Recomputes counts and hidden flags from the mask.
    pub(crate) fn recount(&mut self, snapshot: &Snapshot) {
        let mut remaining = vec![0u32; snapshot.palette_len()];
        for (filled, &label) in self.fill_mask.iter().zip(snapshot.label_grid()) {
            if !filled {
                remaining[label as usize] += 1;
            }
        }
        self.hidden = remaining.iter().map(|&c| c == 0).collect();
        self.remaining = remaining;
    }

    /// Clears every fill in place.
    pub(crate) fn reset(&mut self, snapshot: &Snapshot) {
        self.fill_mask.fill(false);
        self.remaining.fill(0);
        for &label in snapshot.label_grid() {
            self.remaining[label as usize] += 1;
        }
        for (hidden, &count) in self.hidden.iter_mut().zip(&self.remaining) {
            *hidden = count == 0;
        }
    }

    pub fn fill_mask(&self) -> &[bool] {
        &self.fill_mask
    }

    pub fn remaining_counts(&self) -> &[u32] {
        &self.remaining
    }

    pub fn hidden_flags(&self) -> &[bool] {
        &self.hidden
    }

    pub fn is_filled(&self, index: usize) -> bool {
        self.fill_mask.get(index).copied().unwrap_or(false)
    }

    pub fn is_hidden(&self, color: usize) -> bool {
        self.hidden.get(color).copied().unwrap_or(false)
    }

    pub fn filled_count(&self) -> usize {
        self.fill_mask.iter().filter(|f| **f).count()
    }

    pub fn is_complete(&self) -> bool {
        self.fill_mask.iter().all(|f| *f)
    }

    /// Completion rounded to whole percent
    pub fn percent(&self) -> u8 {
        if self.fill_mask.is_empty() {
            return 0;
        }
        ((self.filled_count() as f64 / self.fill_mask.len() as f64) * 100.0).round() as u8
    }

    /// Marks a cell filled and decrements its color's count.
    ///
    /// Returns `true` if this emptied the color (it is now hidden).
    pub(crate) fn fill(&mut self, index: usize, color: usize) -> bool {
        self.fill_mask[index] = true;
        let remaining = &mut self.remaining[color];
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 && !self.hidden[color] {
            self.hidden[color] = true;
            return true;
        }
        false
    }
}
