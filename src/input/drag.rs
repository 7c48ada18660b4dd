/// Collapses pointer samples into at most one brush application per frame.
///
/// Only the latest cell seen before a frame is painted; cells the pointer
/// skipped over between two frames are not retraced.
#[derive(Debug, Default, Clone)]
pub struct DragCoalescer {
    dragging: bool,
    latest: Option<usize>,
    frame_pending: bool,
}

impl DragCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Starts a stroke. Returns true if the caller must request a frame.
    pub fn pointer_down(&mut self, cell: usize) -> bool {
        self.dragging = true;
        self.push(cell)
    }

    /// Records a sample while dragging. Returns true if a frame must be requested.
    pub fn pointer_move(&mut self, cell: usize) -> bool {
        if !self.dragging {
            return false;
        }
        self.push(cell)
    }

    /// Ends the stroke and drops any frame not yet applied.
    pub fn pointer_up(&mut self) {
        self.dragging = false;
        self.frame_pending = false;
        self.latest = None;
    }

    /// Called once per rendered frame; yields the cell to paint, if any.
    pub fn take_frame(&mut self) -> Option<usize> {
        if !self.frame_pending {
            return None;
        }
        self.frame_pending = false;
        self.latest
    }

    fn push(&mut self, cell: usize) -> bool {
        self.latest = Some(cell);
        let request = !self.frame_pending;
        self.frame_pending = true;
        request
    }
}
