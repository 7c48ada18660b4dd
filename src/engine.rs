//! The paint engine owns the live state of one board: which cells are
//! filled, how many cells of each color remain, which colors are finished and
//! which color is selected.
//!
//! All fill operations share one rule: a cell goes from unfilled to filled,
//! never back, and the per-color bookkeeping is updated for that cell in the
//! same pass. Only [`PaintEngine::reset`] clears fills.

use crate::document::{Progress, Snapshot};
use crate::event::EventBus;
use crate::tool::{AreaFillPolicy, BombTool, OffsetCache};

/// What a single engine operation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaintReport {
    /// Newly filled cells, in visit order
    pub filled: Vec<usize>,
    /// Colors whose last cell was filled by this operation
    pub completed_colors: Vec<usize>,
    /// `(old, new)` if the selection moved
    pub selection_change: Option<(usize, usize)>,
    /// The board became complete with this operation
    pub board_completed: bool,
    /// The board was reset
    pub reset: bool,
}

impl PaintReport {
    /// True if the board state changed and should be saved
    pub fn is_mutation(&self) -> bool {
        !self.filled.is_empty() || self.reset
    }
}

#[derive(Debug)]
pub struct PaintEngine {
    snapshot: Snapshot,
    progress: Progress,
    totals: Vec<u32>,
    selected: usize,
    done: bool,
    area_fill_policy: AreaFillPolicy,
    offsets: OffsetCache,
    event_bus: EventBus,
}

impl PaintEngine {
    /// Starts painting a board from its saved (or fresh) progress.
    pub fn new(snapshot: Snapshot, progress: Progress) -> Self {
        let totals = snapshot.color_totals();
        let done = progress.is_complete();
        let mut engine = Self {
            snapshot,
            progress,
            totals,
            selected: 0,
            done,
            area_fill_policy: AreaFillPolicy::default(),
            offsets: OffsetCache::new(),
            event_bus: EventBus::new(),
        };
        engine.selected = engine.first_available();
        engine
    }

    pub fn with_area_fill_policy(mut self, policy: AreaFillPolicy) -> Self {
        self.area_fill_policy = policy;
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn area_fill_policy(&self) -> AreaFillPolicy {
        self.area_fill_policy
    }

    pub fn set_area_fill_policy(&mut self, policy: AreaFillPolicy) {
        self.area_fill_policy = policy;
    }

    /// Total cells of each color on the board
    pub fn color_totals(&self) -> &[u32] {
        &self.totals
    }

    pub fn is_complete(&self) -> bool {
        self.done
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress.percent()
    }

    /// Unfilled cell of the active color, i.e. one a front end should highlight
    pub fn is_highlighted(&self, index: usize) -> bool {
        !self.progress.is_hidden(self.selected)
            && !self.progress.is_filled(index)
            && self.snapshot.label(index) == Some(self.selected)
    }

    /// Changes the active color. Hidden or unknown colors are ignored.
    pub fn select(&mut self, color: usize) -> Option<(usize, usize)> {
        if color >= self.snapshot.palette_len() || self.progress.is_hidden(color) {
            return None;
        }
        if color == self.selected {
            return None;
        }
        let old = self.selected;
        self.selected = color;
        self.event_bus.publish(&PaintReport {
            selection_change: Some((old, color)),
            ..Default::default()
        });
        Some((old, color))
    }

    /// Fills one cell if it belongs to `color`.
    pub fn paint_cell(&mut self, index: usize, color: usize) -> PaintReport {
        let mut report = PaintReport::default();
        if self.snapshot.label(index) == Some(color) && !self.progress.is_filled(index) {
            self.fill(index, &mut report);
        }
        self.finish(report)
    }

    /// Fills every cell of `color` within `radius` of `center`.
    pub fn paint_brush(&mut self, center: usize, radius: u32, color: usize) -> PaintReport {
        self.fill_disk(center, radius, Some(color))
    }

    /// Drops a bomb at `center`, filling according to the area-fill policy.
    pub fn area_fill(&mut self, center: usize, radius: u32) -> PaintReport {
        let only = match self.area_fill_policy {
            AreaFillPolicy::AllColors => None,
            AreaFillPolicy::SelectedColorOnly => Some(self.selected),
        };
        self.fill_disk(center, radius, only)
    }

    /// Bomb radius for this board
    pub fn bomb_radius(&self) -> u32 {
        BombTool::radius_for(self.snapshot.cols())
    }

    /// Clears every fill and restores counts from the label grid.
    pub fn reset(&mut self) -> PaintReport {
        self.progress.reset(&self.snapshot);
        self.done = self.progress.is_complete();
        let old = self.selected;
        self.selected = self.first_available();

        let mut report = PaintReport {
            reset: true,
            ..Default::default()
        };
        if old != self.selected {
            report.selection_change = Some((old, self.selected));
        }
        self.event_bus.publish(&report);
        report
    }

    fn fill_disk(&mut self, center: usize, radius: u32, only: Option<usize>) -> PaintReport {
        let mut report = PaintReport::default();
        if center >= self.snapshot.cell_count() {
            return self.finish(report);
        }
        let (cx, cy) = self.snapshot.coords_of(center);
        let offsets = self.offsets.disk(radius);

        for &(dx, dy) in offsets.iter() {
            let Some(index) = self.snapshot.index_of(cx + dx, cy + dy) else {
                continue;
            };
            if self.progress.is_filled(index) {
                continue;
            }
            if let Some(color) = only {
                if self.snapshot.label(index) != Some(color) {
                    continue;
                }
            }
            self.fill(index, &mut report);
        }
        self.finish(report)
    }

    /// Fills an unfilled cell and applies the per-color bookkeeping.
    fn fill(&mut self, index: usize, report: &mut PaintReport) {
        let Some(color) = self.snapshot.label(index) else {
            return;
        };
        report.filled.push(index);
        if self.progress.fill(index, color) {
            report.completed_colors.push(color);
            if color == self.selected {
                let next = self.next_available(color);
                if next != color {
                    self.selected = next;
                    report.selection_change = match report.selection_change {
                        Some((old, _)) => Some((old, next)),
                        None => Some((color, next)),
                    };
                }
            }
        }
    }

    /// Runs completion detection and publishes the operation's events.
    fn finish(&mut self, mut report: PaintReport) -> PaintReport {
        if report.filled.is_empty() {
            return report;
        }
        let complete = self.progress.is_complete();
        if complete && !self.done {
            self.done = true;
            report.board_completed = true;
            log::info!("Board completed");
        } else if !complete {
            self.done = false;
        }
        self.event_bus.publish(&report);
        report
    }

    /// Next non-hidden color after `start`, cycling; `start` if none is left.
    fn next_available(&self, start: usize) -> usize {
        let k = self.snapshot.palette_len();
        (1..=k)
            .map(|step| (start + step) % k)
            .find(|&c| !self.progress.is_hidden(c))
            .unwrap_or(start)
    }

    fn first_available(&self) -> usize {
        (0..self.snapshot.palette_len())
            .find(|&c| !self.progress.is_hidden(c))
            .unwrap_or(0)
    }
}
