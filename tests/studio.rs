use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::{Rgba, RgbaImage};
use pixel_paint::config::{Config, GeneratorConfig};
use pixel_paint::document::ArtworkId;
use pixel_paint::error::SessionError;
use pixel_paint::event::PaintEvent;
use pixel_paint::state::{
    KeyValueStore, LEGACY_LIST_KEY, MemoryStore, SaveStatus, Studio, View, legacy_item_key,
};
use pixel_paint::state::codec;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn config() -> Config {
    Config {
        generator: GeneratorConfig {
            cells_across: 8,
            palette_size: 2,
            seed: Some(3),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// 8x8, left half black, right half white: labels are 0 for x < 4, else 1
fn split_image() -> RgbaImage {
    RgbaImage::from_fn(8, 8, |x, _| {
        if x < 4 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

fn create_studio() -> (Studio<Arc<MemoryStore>>, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    (Studio::new(backend.clone(), config()), backend)
}

fn saved_progress(studio: &Studio<Arc<MemoryStore>>, id: &ArtworkId) -> u8 {
    studio.persistence().meta(id).unwrap().progress_percent
}

#[test]
fn test_generate_opens_board() {
    let (mut studio, _) = create_studio();
    assert_eq!(studio.view(), View::Home);

    let id = studio.generate(&split_image(), Some("Halves"), Instant::now()).unwrap();
    assert_eq!(studio.view(), View::Board);
    assert_eq!(studio.active_id(), Some(&id));
    assert_eq!(studio.title(), Some("Halves"));

    let engine = studio.engine().unwrap();
    assert_eq!((engine.snapshot().cols(), engine.snapshot().rows()), (8, 8));
    assert_eq!(engine.selected(), 0);
    assert_eq!(studio.gallery().len(), 1);
}

#[test]
fn test_autosave_after_quiet_period() {
    let (mut studio, _) = create_studio();
    let t0 = Instant::now();
    let id = studio.generate(&split_image(), None, t0).unwrap();

    // Past the generation cooldown
    let t1 = t0 + ms(2_000);
    let report = studio.paint_cell(0, t1).unwrap();
    assert_eq!(report.filled, vec![0]);
    assert!(studio.autosave_pending());

    assert!(!studio.tick(t1 + ms(399)));
    assert_eq!(saved_progress(&studio, &id), 0);
    assert!(studio.tick(t1 + ms(400)));
    assert_eq!(saved_progress(&studio, &id), 2);
    assert_eq!(studio.save_status(t1 + ms(500)), SaveStatus::Saved);
    assert_eq!(studio.save_status(t1 + ms(1_500)), SaveStatus::Idle);
}

#[test]
fn test_switching_forces_save_of_outgoing_board() {
    let (mut studio, _) = create_studio();
    let t0 = Instant::now();
    let first = studio.generate(&split_image(), Some("First"), t0).unwrap();
    studio.paint_cell(0, t0 + ms(2_000)).unwrap();

    let second = studio.generate(&split_image(), Some("Second"), t0 + ms(2_050)).unwrap();
    assert_eq!(saved_progress(&studio, &first), 2);
    assert!(!studio.autosave_pending());
    assert_eq!(studio.active_id(), Some(&second));

    // The first board's pending save must not fire for the second
    assert!(!studio.tick(t0 + ms(5_000)));

    studio.open(&first, t0 + ms(6_000)).unwrap();
    assert!(studio.engine().unwrap().progress().is_filled(0));
    assert_eq!(studio.title(), Some("First"));
}

#[test]
fn test_open_missing_board_keeps_current_session() {
    let (mut studio, _) = create_studio();
    let t0 = Instant::now();
    let id = studio.generate(&split_image(), None, t0).unwrap();

    let err = studio.open(&ArtworkId::new("nope"), t0 + ms(10)).unwrap_err();
    assert!(matches!(err, SessionError::MissingSnapshot(_)));
    assert_eq!(studio.active_id(), Some(&id));
    assert_eq!(studio.view(), View::Board);
}

#[test]
fn test_delete_active_board_returns_home() {
    let (mut studio, backend) = create_studio();
    let id = studio.generate(&split_image(), None, Instant::now()).unwrap();
    studio.delete(&id).unwrap();

    assert_eq!(studio.view(), View::Home);
    assert!(studio.gallery().is_empty());
    assert!(backend.keys().iter().all(|k| !k.contains(id.as_str())));
    assert!(matches!(studio.export_png(), Err(SessionError::NoSession)));
}

#[test]
fn test_failed_save_keeps_engine_state() {
    let (mut studio, backend) = create_studio();
    let t0 = Instant::now();
    let id = studio.generate(&split_image(), None, t0).unwrap();
    backend.set_quota(Some(backend.used_bytes() - 1));

    studio.paint_cell(0, t0 + ms(2_000)).unwrap();
    assert!(!studio.save_now(t0 + ms(2_100)));
    assert_eq!(studio.save_status(t0 + ms(2_100)), SaveStatus::Idle);
    assert!(studio.engine().unwrap().progress().is_filled(0));
    assert_eq!(saved_progress(&studio, &id), 0);

    backend.set_quota(None);
    assert!(studio.save_now(t0 + ms(2_200)));
    assert_eq!(saved_progress(&studio, &id), 2);
}

#[test]
fn test_completion_saves_immediately() {
    let (mut studio, _) = create_studio();
    let t0 = Instant::now();
    let id = studio.generate(&split_image(), None, t0).unwrap();

    let completed = Rc::new(RefCell::new(0));
    let counter = completed.clone();
    studio.engine().unwrap().event_bus().subscribe(Box::new(move |event: &PaintEvent| {
        if *event == PaintEvent::BoardCompleted {
            *counter.borrow_mut() += 1;
        }
    }));

    studio.set_brush_size(20);
    let t1 = t0 + ms(2_000);
    studio.paint_brush(0, t1).unwrap();
    assert_eq!(studio.engine().unwrap().selected(), 1);
    let report = studio.paint_brush(0, t1).unwrap();
    assert!(report.board_completed);
    assert_eq!(*completed.borrow(), 1);

    let meta = studio.persistence().meta(&id).unwrap();
    assert_eq!(meta.progress_percent, 100);
    assert!(meta.thumbnail.unwrap().starts_with("data:image/png;base64,"));
    assert!(!studio.autosave_pending());
}

#[test]
fn test_selecting_finished_color_is_ignored() {
    let (mut studio, _) = create_studio();
    let t0 = Instant::now();
    studio.generate(&split_image(), None, t0).unwrap();

    studio.set_brush_size(20);
    let t1 = t0 + ms(2_000);
    studio.paint_brush(0, t1).unwrap();
    assert_eq!(studio.engine().unwrap().selected(), 1);

    let report = studio.select(0, t1).unwrap();
    assert_eq!(report.selection_change, None);
    assert!(!report.is_mutation());
    assert_eq!(studio.select(9, t1).unwrap().selection_change, None);
    assert_eq!(studio.engine().unwrap().selected(), 1);
}

#[test]
fn test_drag_paints_latest_cell_once_per_frame() {
    let (mut studio, _) = create_studio();
    let t0 = Instant::now();
    studio.generate(&split_image(), None, t0).unwrap();

    assert!(studio.pointer_down(0));
    assert!(!studio.pointer_move(1));
    assert!(!studio.pointer_move(2));
    let report = studio.frame(t0).unwrap();
    assert_eq!(report.filled, vec![2]);
    assert!(studio.frame(t0).is_none());

    studio.pointer_move(9);
    studio.pointer_up();
    assert!(studio.frame(t0).is_none());
    assert!(!studio.engine().unwrap().progress().is_filled(9));
}

#[test]
fn test_title_persists_with_save() {
    let (mut studio, _) = create_studio();
    let t0 = Instant::now();
    let id = studio.generate(&split_image(), None, t0).unwrap();
    studio.set_title("  Sunset ", t0 + ms(10));
    studio.close(t0 + ms(20));

    assert_eq!(studio.view(), View::Home);
    assert_eq!(studio.persistence().meta(&id).unwrap().title, "Sunset");
}

#[test]
fn test_export_png_of_open_board() {
    let (mut studio, _) = create_studio();
    studio.generate(&split_image(), None, Instant::now()).unwrap();
    let png = studio.export_png().unwrap();
    assert_eq!(&png[1..4], b"PNG");

    let image = studio.render_board().unwrap();
    assert_eq!(image.dimensions(), (8 * 24, 8 * 24));
}

#[test]
fn test_legacy_boards_imported_on_startup() {
    let backend = Arc::new(MemoryStore::new());
    backend.set(LEGACY_LIST_KEY, r#"[{"id":"v1board","title":"Old"}]"#).unwrap();
    let item = serde_json::json!({
        "cols": 2,
        "rows": 1,
        "palette": [[0, 0, 0], [255, 255, 255]],
        "kIdx": codec::encode_bytes(&[0, 1]),
        "mask": codec::encode_bytes(&[0, 0]),
        "counts": [1, 1],
        "hidden": [0, 0],
    });
    backend.set(&legacy_item_key("v1board"), &item.to_string()).unwrap();

    let mut studio = Studio::new(backend.clone(), config());
    assert_eq!(studio.migration_report().migrated, 1);
    let id = ArtworkId::new("v1board");
    studio.open(&id, Instant::now()).unwrap();
    assert_eq!(studio.title(), Some("Old"));

    let again = Studio::new(backend, config());
    assert!(!again.migration_report().ran);
    assert_eq!(again.gallery().len(), 1);
}
