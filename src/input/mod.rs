//! Turns pointer input into cell indices and paces brush strokes to the
//! render loop.

mod drag;

pub use drag::DragCoalescer;

/// Maps viewport coordinates onto board cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    /// Size of one cell in canvas pixels
    pub cell_px: f32,
    pub zoom: f32,
    /// Canvas origin inside the viewport
    pub offset: (f32, f32),
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            cell_px: 24.0,
            zoom: 1.0,
            offset: (0.0, 0.0),
        }
    }
}

impl CanvasView {
    /// Cell under a viewport position, `None` outside the board
    pub fn cell_at(&self, x: f32, y: f32, cols: u32, rows: u32) -> Option<usize> {
        if self.zoom <= 0.0 || self.cell_px <= 0.0 {
            return None;
        }
        let cx = (x - self.offset.0) / self.zoom;
        let cy = (y - self.offset.1) / self.zoom;
        let width = cols as f32 * self.cell_px;
        let height = rows as f32 * self.cell_px;
        if cx < 0.0 || cy < 0.0 || cx >= width || cy >= height {
            return None;
        }
        let col = ((cx / self.cell_px).floor() as u32).min(cols - 1);
        let row = ((cy / self.cell_px).floor() as u32).min(rows - 1);
        Some(row as usize * cols as usize + col as usize)
    }
}
