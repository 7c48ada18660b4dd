pub mod types;

// Re-export specific tool implementations
pub use types::bomb::{AreaFillPolicy, BombTool};
pub use types::brush::{BrushTool, OffsetCache};
