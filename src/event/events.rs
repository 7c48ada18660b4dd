use crate::engine::PaintReport;

/// Notifications emitted by the paint engine after it mutates a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintEvent {
    /// Cells that became filled, in visit order
    CellsFilled {
        cells: Vec<usize>,
    },
    /// Every cell of a color is filled; the color is now hidden
    ColorCompleted {
        color: usize,
    },
    SelectionChanged {
        old: usize,
        new: usize,
    },
    /// Fired once when the last cell is filled
    BoardCompleted,
    BoardReset,
}

impl PaintEvent {
    /// Events describing one engine operation, in emission order.
    pub fn from_report(report: &PaintReport) -> Vec<PaintEvent> {
        let mut events = Vec::new();
        if report.reset {
            events.push(PaintEvent::BoardReset);
        }
        if !report.filled.is_empty() {
            events.push(PaintEvent::CellsFilled {
                cells: report.filled.clone(),
            });
        }
        events.extend(
            report
                .completed_colors
                .iter()
                .map(|&color| PaintEvent::ColorCompleted { color }),
        );
        if let Some((old, new)) = report.selection_change {
            events.push(PaintEvent::SelectionChanged { old, new });
        }
        if report.board_completed {
            events.push(PaintEvent::BoardCompleted);
        }
        events
    }
}
