//! Headless front end: turns an image into a stored board and writes the
//! printable PNG.
//!
//!   pixel-paint photo.jpg --store boards/ --colors 16 --output photo-board.png

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use pixel_paint::config::Config;
use pixel_paint::state::{FileStore, Studio};
use pixel_paint::{board, export};

#[derive(Parser, Debug)]
#[command(name = "pixel-paint", about = "Generate paint-by-number boards from images")]
struct CliArgs {
    /// Source image (PNG, JPEG, ...)
    input: PathBuf,

    /// Directory holding the saved gallery
    #[arg(long, default_value = "pixel-paint-store", value_name = "DIR")]
    store: PathBuf,

    /// JSON config file; missing fields use defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Board title; a random one is generated when omitted
    #[arg(short, long)]
    title: Option<String>,

    /// Grid width in cells
    #[arg(long, value_name = "N")]
    cells: Option<u32>,

    /// Palette size (2-48)
    #[arg(short = 'k', long, value_name = "K")]
    colors: Option<usize>,

    /// Seed for reproducible palettes
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the numbered board PNG
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write a pixelated rendition of the source here
    #[arg(long, value_name = "FILE")]
    pixelated: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(CliArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(cells) = args.cells {
        config.generator.cells_across = cells;
    }
    if let Some(colors) = args.colors {
        config.generator.palette_size = colors;
    }
    if args.seed.is_some() {
        config.generator.seed = args.seed;
    }

    let source = board::open_source(&args.input)?;
    if let Some(path) = &args.pixelated {
        let pixelated =
            export::pixelate_source(&source, config.generator.cells_across, config.export.cell_px);
        pixelated.save(path)?;
        log::info!("Wrote pixelated source to {}", path.display());
    }

    let store = FileStore::new(&args.store)?;
    let mut studio = Studio::new(store, config);
    let id = studio.generate(&source, args.title.as_deref(), Instant::now())?;
    log::info!("Stored board `{}` in {}", id, args.store.display());

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("board.png"));
    export::write_png(&output, &studio.render_board()?)?;

    studio.close(Instant::now());
    Ok(())
}
