pub mod bomb;
pub mod brush;

pub use bomb::BombTool;
pub use brush::BrushTool;
