use super::{CommandError, CommandResult};
use crate::engine::{PaintEngine, PaintReport};
use crate::tool::BrushTool;
use serde::{Deserialize, Serialize};

/// Player actions that can be applied to a paint engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Fill one cell with the active color
    PaintCell { index: usize },

    /// Paint a brush disk of the active color
    PaintBrush { center: usize },

    /// Drop a bomb
    AreaFill { center: usize },

    /// Change the active color
    Select(usize),

    /// Clear every fill
    Reset,
}

impl Command {
    /// Returns true if the command can fill or clear cells
    pub fn mutates_board(&self) -> bool {
        !matches!(self, Command::Select(_))
    }

    /// Apply the command, using the engine's selection and the given brush.
    pub fn execute(&self, engine: &mut PaintEngine, brush: &BrushTool) -> CommandResult {
        let report = match *self {
            Command::PaintCell { index } => {
                let color = engine.selected();
                engine.paint_cell(index, color)
            }
            Command::PaintBrush { center } => {
                let color = engine.selected();
                engine.paint_brush(center, brush.radius(), color)
            }
            Command::AreaFill { center } => {
                let radius = engine.bomb_radius();
                engine.area_fill(center, radius)
            }
            Command::Select(color) => {
                if color == engine.selected() {
                    return Ok(PaintReport::default());
                }
                let change = engine
                    .select(color)
                    .ok_or(CommandError::ColorUnavailable(color))?;
                PaintReport {
                    selection_change: Some(change),
                    ..Default::default()
                }
            }
            Command::Reset => engine.reset(),
        };
        Ok(report)
    }
}
