use serde::{Deserialize, Serialize};

/// Which cells an area fill may paint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaFillPolicy {
    /// Every unfilled cell inside the radius, whatever its color
    #[default]
    AllColors,
    /// Only unfilled cells of the active selection
    SelectedColorOnly,
}

/// The bomb fills a disk around the point where it is dropped. Its size
/// depends only on the board width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BombTool;

impl BombTool {
    /// Blast radius in cells for a board `cols` wide
    pub fn radius_for(cols: u32) -> u32 {
        (cols / 20).max(1)
    }
}
