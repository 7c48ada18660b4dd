#![warn(clippy::all, rust_2018_idioms)]

pub mod board;
pub mod color;
pub mod command;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod event;
pub mod export;
pub mod id_generator;
pub mod input;
pub mod quantize;
pub mod state;
pub mod tool;
pub mod util;

pub use board::{BoardGenerator, GeneratedBoard};
pub use command::Command;
pub use config::Config;
pub use document::{ArtworkId, ArtworkMeta, Progress, Snapshot};
pub use engine::{PaintEngine, PaintReport};
pub use event::{EventBus, PaintEvent};
pub use export::ExportOptions;
pub use input::{CanvasView, DragCoalescer};
pub use quantize::Quantizer;
pub use state::{FileStore, KeyValueStore, MemoryStore, PersistenceStore, Studio, View};
pub use tool::{AreaFillPolicy, BrushTool};
