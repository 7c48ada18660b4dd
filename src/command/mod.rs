mod commands;

pub use commands::Command;

use crate::engine::PaintReport;
pub use crate::error::CommandError;

/// Result type for command operations
pub type CommandResult = Result<PaintReport, CommandError>;
