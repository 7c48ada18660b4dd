use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 20;

/// The brush paints a disk of cells around the pointer, restricted to the
/// selected color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushTool {
    /// Diameter-ish size in cells; 1 paints a single cell
    size: u32,
}

impl Default for BrushTool {
    fn default() -> Self {
        Self { size: MIN_BRUSH_SIZE }
    }
}

impl BrushTool {
    pub fn new(size: u32) -> Self {
        Self {
            size: size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    /// Disk radius in cells (`size - 1`)
    pub fn radius(&self) -> u32 {
        self.size - 1
    }

    pub fn grow(&mut self) {
        self.set_size(self.size + 1);
    }

    pub fn shrink(&mut self) {
        self.set_size(self.size.saturating_sub(1));
    }
}

/// Cell offsets covered by a disk, computed once per radius.
///
/// Offsets are ordered row-major (`dy` outer, `dx` inner) so fills visit cells
/// in the same order every time.
#[derive(Debug, Default)]
pub struct OffsetCache {
    disks: HashMap<u32, Rc<[(i64, i64)]>>,
}

impl OffsetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disk(&mut self, radius: u32) -> Rc<[(i64, i64)]> {
        self.disks
            .entry(radius)
            .or_insert_with(|| disk_offsets(radius))
            .clone()
    }

    /// Number of radii computed so far
    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }
}

fn disk_offsets(radius: u32) -> Rc<[(i64, i64)]> {
    let r = radius as i64;
    let r2 = r * r;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r2 {
                offsets.push((dx, dy));
            }
        }
    }
    offsets.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_zero_is_single_cell() {
        assert_eq!(&*disk_offsets(0), &[(0, 0)]);
    }

    #[test]
    fn radius_one_is_plus_shape() {
        assert_eq!(&*disk_offsets(1), &[(0, -1), (-1, 0), (0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn cache_reuses_offsets() {
        let mut cache = OffsetCache::new();
        let a = cache.disk(3);
        let b = cache.disk(3);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn brush_size_is_clamped() {
        let mut brush = BrushTool::new(0);
        assert_eq!(brush.size(), 1);
        brush.shrink();
        assert_eq!(brush.radius(), 0);
        brush.set_size(99);
        assert_eq!(brush.size(), MAX_BRUSH_SIZE);
        brush.grow();
        assert_eq!(brush.size(), MAX_BRUSH_SIZE);
    }
}
