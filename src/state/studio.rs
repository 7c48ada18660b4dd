//! The session owner a front end drives.

use std::time::{Duration, Instant};

use image::{RgbImage, RgbaImage};

use super::autosave::{AutosaveScheduler, SessionToken};
use super::persistence::{MigrationReport, PersistenceStore, SaveReason};
use super::storage::KeyValueStore;
use crate::board::BoardGenerator;
use crate::command::Command;
use crate::config::Config;
use crate::document::{ArtworkId, ArtworkMeta};
use crate::engine::{PaintEngine, PaintReport};
use crate::error::{CommandError, SessionError, SessionResult};
use crate::export;
use crate::input::DragCoalescer;
use crate::tool::{AreaFillPolicy, BrushTool};
use crate::util::time;

/// How long the "saved" indicator stays up
const SAVED_FLASH: Duration = Duration::from_millis(700);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Gallery and upload form
    Home,
    /// A board is open for painting
    Board,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saved,
}

#[derive(Debug)]
struct Session {
    id: ArtworkId,
    token: SessionToken,
    title: String,
    engine: PaintEngine,
}

/// Owns the gallery store and at most one open board.
///
/// Every operation that can change the board takes the current time so
/// autosave can be scheduled without a background timer; call
/// [`Studio::tick`] regularly to let due saves run.
#[derive(Debug)]
pub struct Studio<S> {
    store: PersistenceStore<S>,
    generator: BoardGenerator,
    config: Config,
    scheduler: AutosaveScheduler,
    session: Option<Session>,
    brush: BrushTool,
    drag: DragCoalescer,
    last_saved: Option<Instant>,
    migration: MigrationReport,
}

impl<S: KeyValueStore> Studio<S> {
    /// Opens a studio on `store`, importing legacy boards on first use.
    pub fn new(store: S, config: Config) -> Self {
        let store = PersistenceStore::new(store).with_thumbnail_width(config.generator.thumbnail_width);
        let migration = store.migrate_legacy(time::timestamp_millis()).unwrap_or_else(|err| {
            log::error!("Legacy migration failed: {}", err);
            MigrationReport::default()
        });
        Self {
            generator: BoardGenerator::new(config.generator.clone()),
            scheduler: AutosaveScheduler::new(&config.autosave),
            brush: config.paint.brush(),
            store,
            config,
            session: None,
            drag: DragCoalescer::new(),
            last_saved: None,
            migration,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn persistence(&self) -> &PersistenceStore<S> {
        &self.store
    }

    pub fn migration_report(&self) -> MigrationReport {
        self.migration
    }

    pub fn gallery(&self) -> Vec<ArtworkMeta> {
        self.store.list()
    }

    pub fn view(&self) -> View {
        if self.session.is_some() {
            View::Board
        } else {
            View::Home
        }
    }

    pub fn active_id(&self) -> Option<&ArtworkId> {
        self.session.as_ref().map(|s| &s.id)
    }

    pub fn session_token(&self) -> Option<SessionToken> {
        self.session.as_ref().map(|s| s.token)
    }

    pub fn engine(&self) -> Option<&PaintEngine> {
        self.session.as_ref().map(|s| &s.engine)
    }

    pub fn title(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.title.as_str())
    }

    pub fn set_title(&mut self, title: &str, now: Instant) {
        if let Some(session) = &mut self.session {
            session.title = title.trim().to_owned();
            self.scheduler.mark_dirty(now);
        }
    }

    pub fn brush(&self) -> BrushTool {
        self.brush
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush.set_size(size);
    }

    pub fn grow_brush(&mut self) {
        self.brush.grow();
    }

    pub fn shrink_brush(&mut self) {
        self.brush.shrink();
    }

    pub fn set_area_fill_policy(&mut self, policy: AreaFillPolicy) {
        self.config.paint.area_fill = policy;
        if let Some(session) = &mut self.session {
            session.engine.set_area_fill_policy(policy);
        }
    }

    pub fn set_autosave(&mut self, enabled: bool) {
        self.config.autosave.enabled = enabled;
        self.scheduler.set_enabled(enabled);
    }

    pub fn autosave_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn save_status(&self, now: Instant) -> SaveStatus {
        match self.last_saved {
            Some(at) if now.saturating_duration_since(at) < SAVED_FLASH => SaveStatus::Saved,
            _ => SaveStatus::Idle,
        }
    }

    /// Builds a board from `image`, stores it and opens it.
    pub fn generate(
        &mut self,
        image: &RgbaImage,
        title: Option<&str>,
        now: Instant,
    ) -> SessionResult<ArtworkId> {
        self.leave_session(SaveReason::Generate, now);
        let board = self.generator.generate(image, title, time::timestamp_millis())?;
        self.store.create_new(&board.meta, &board.snapshot, &board.progress)?;

        let id = board.meta.id.clone();
        let engine = PaintEngine::new(board.snapshot, board.progress);
        self.start_session(id.clone(), board.meta.title, engine);
        Ok(id)
    }

    /// Opens a stored board, saving the current one first.
    ///
    /// If the board cannot be loaded the current session stays open.
    pub fn open(&mut self, id: &ArtworkId, now: Instant) -> SessionResult<()> {
        self.leave_session(SaveReason::Switch, now);

        let snapshot = self
            .store
            .load_snapshot(id)
            .ok_or_else(|| SessionError::MissingSnapshot(id.to_string()))?;
        let progress = self
            .store
            .load_progress(id, &snapshot)
            .ok_or_else(|| SessionError::MissingProgress(id.to_string()))?;
        let title = self.store.meta(id).map(|m| m.title).unwrap_or_default();

        self.start_session(id.clone(), title, PaintEngine::new(snapshot, progress));
        Ok(())
    }

    /// Saves and closes the open board.
    pub fn close(&mut self, now: Instant) {
        self.leave_session(SaveReason::Close, now);
        if let Some(session) = self.session.take() {
            log::info!("Closed `{}`", session.id);
        }
        self.scheduler.end_session();
    }

    /// Removes a board from the gallery. Deleting the open board closes it
    /// without saving.
    pub fn delete(&mut self, id: &ArtworkId) -> SessionResult<()> {
        if self.active_id() == Some(id) {
            self.session = None;
            self.scheduler.cancel();
            self.scheduler.end_session();
            self.drag.pointer_up();
        }
        self.store.delete(id)?;
        Ok(())
    }

    /// Saves the open board right away. Failures are logged, not raised.
    pub fn save_now(&mut self, now: Instant) -> bool {
        self.scheduler.cancel();
        self.save_session(SaveReason::Manual, now)
    }

    /// Runs the autosave if it has come due. Returns true if a save happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.scheduler.poll(now) {
            Some(token) if self.session_token() == Some(token) => {
                self.save_session(SaveReason::Autosave, now)
            }
            _ => false,
        }
    }

    /// Applies a command to the open board.
    pub fn execute(&mut self, command: Command, now: Instant) -> SessionResult<PaintReport> {
        let session = self.session.as_mut().ok_or(SessionError::NoSession)?;
        let report = command.execute(&mut session.engine, &self.brush)?;

        if report.board_completed && self.scheduler.is_enabled() {
            self.scheduler.cancel();
            self.save_session(SaveReason::Completed, now);
        } else if report.is_mutation() {
            self.scheduler.mark_dirty(now);
        }
        Ok(report)
    }

    pub fn paint_cell(&mut self, index: usize, now: Instant) -> SessionResult<PaintReport> {
        self.execute(Command::PaintCell { index }, now)
    }

    pub fn paint_brush(&mut self, center: usize, now: Instant) -> SessionResult<PaintReport> {
        self.execute(Command::PaintBrush { center }, now)
    }

    pub fn area_fill(&mut self, center: usize, now: Instant) -> SessionResult<PaintReport> {
        self.execute(Command::AreaFill { center }, now)
    }

    /// Changes the active color. Unknown or finished colors are ignored and
    /// yield an empty report.
    pub fn select(&mut self, color: usize, now: Instant) -> SessionResult<PaintReport> {
        match self.execute(Command::Select(color), now) {
            Err(SessionError::Command(CommandError::ColorUnavailable(color))) => {
                log::debug!("Ignoring selection of unavailable color {}", color);
                Ok(PaintReport::default())
            }
            result => result,
        }
    }

    pub fn reset(&mut self, now: Instant) -> SessionResult<PaintReport> {
        self.execute(Command::Reset, now)
    }

    /// Starts a brush stroke. Returns true if the caller should request a
    /// redraw.
    pub fn pointer_down(&mut self, cell: usize) -> bool {
        self.session.is_some() && self.drag.pointer_down(cell)
    }

    pub fn pointer_move(&mut self, cell: usize) -> bool {
        self.session.is_some() && self.drag.pointer_move(cell)
    }

    pub fn pointer_up(&mut self) {
        self.drag.pointer_up();
    }

    /// Called once per rendered frame: paints the latest dragged-over cell.
    pub fn frame(&mut self, now: Instant) -> Option<PaintReport> {
        let center = self.drag.take_frame()?;
        self.paint_brush(center, now).ok()
    }

    /// The open board rendered with the configured export options.
    pub fn render_board(&self) -> SessionResult<RgbImage> {
        let session = self.session.as_ref().ok_or(SessionError::NoSession)?;
        Ok(export::render_board(
            session.engine.snapshot(),
            session.engine.progress(),
            &self.config.export,
        ))
    }

    pub fn export_png(&self) -> SessionResult<Vec<u8>> {
        Ok(export::encode_png(&self.render_board()?)?)
    }

    fn start_session(&mut self, id: ArtworkId, title: String, engine: PaintEngine) {
        let engine = engine.with_area_fill_policy(self.config.paint.area_fill);
        let token = self.scheduler.begin_session();
        log::info!("Opened `{}` ({}x{})", id, engine.snapshot().cols(), engine.snapshot().rows());
        self.drag.pointer_up();
        self.session = Some(Session {
            id,
            token,
            title,
            engine,
        });
    }

    /// Forced save of the outgoing board, then the autosave cooldown.
    fn leave_session(&mut self, reason: SaveReason, now: Instant) {
        if self.session.is_some() {
            self.save_session(reason, now);
        }
        self.scheduler.start_cooldown(now);
    }

    fn save_session(&mut self, reason: SaveReason, now: Instant) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let result = self.store.save(
            &session.id,
            session.engine.snapshot(),
            session.engine.progress(),
            &session.title,
            time::timestamp_millis(),
            reason,
        );
        match result {
            Ok(Some(_)) => {
                self.last_saved = Some(now);
                true
            }
            Ok(None) => false,
            Err(err) => {
                log::error!("Saving `{}` failed: {}", session.id, err);
                self.last_saved = None;
                false
            }
        }
    }
}
