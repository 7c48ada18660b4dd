//! Turns a source picture into a new puzzle.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::color::{self, Rgb};
use crate::config::GeneratorConfig;
use crate::document::{ArtworkMeta, Progress, Snapshot};
use crate::error::GenerateError;
use crate::export;
use crate::id_generator;
use crate::quantize::Quantizer;

/// Everything needed to register and open a freshly generated board.
#[derive(Debug, Clone)]
pub struct GeneratedBoard {
    pub snapshot: Snapshot,
    pub progress: Progress,
    pub meta: ArtworkMeta,
}

/// Grid size for an image `width`x`height` asked to be `cells_across` wide.
pub fn grid_size(width: u32, height: u32, cells_across: u32) -> (u32, u32) {
    let across = cells_across.min(width).max(1);
    let down = ((height as f64 / width.max(1) as f64) * across as f64).round() as u32;
    (across, down.max(1))
}

/// Shrinks the source to one pixel per cell with a smoothing filter.
pub fn downsample(image: &RgbaImage, cells_across: u32) -> RgbaImage {
    let (across, down) = grid_size(image.width(), image.height(), cells_across);
    imageops::resize(image, across, down, FilterType::Triangle)
}

/// Decodes an encoded image (PNG, JPEG, ...) held in memory.
pub fn load_source(bytes: &[u8]) -> Result<RgbaImage, GenerateError> {
    let image = image::load_from_memory(bytes)?;
    log::debug!("Decoded source image: {}x{}", image.width(), image.height());
    Ok(image.to_rgba8())
}

/// Reads and decodes an image file.
pub fn open_source(path: impl AsRef<Path>) -> Result<RgbaImage, GenerateError> {
    let path = path.as_ref();
    log::info!("Loading source image from {}", path.display());
    let bytes = std::fs::read(path)?;
    load_source(&bytes)
}

#[derive(Debug, Clone, Default)]
pub struct BoardGenerator {
    config: GeneratorConfig,
}

impl BoardGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds snapshot, initial progress and gallery entry for `image`.
    ///
    /// A blank `title` is replaced by a generated one. `now` is the creation
    /// time in milliseconds since the UNIX epoch.
    pub fn generate(
        &self,
        image: &RgbaImage,
        title: Option<&str>,
        now: u64,
    ) -> Result<GeneratedBoard, GenerateError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(GenerateError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }

        let small = downsample(image, self.config.cells_across);
        let (cols, rows) = small.dimensions();
        let points: Vec<Rgb> = small.pixels().map(|p| [p[0], p[1], p[2]]).collect();

        let mut quantizer = match self.config.seed {
            Some(seed) => Quantizer::with_seed(self.config.palette_size(), self.config.iterations(), seed),
            None => Quantizer::new(self.config.palette_size(), self.config.iterations()),
        };
        let clustering = quantizer.quantize(&points)?;

        // Darkest color gets number 1
        let mut order: Vec<usize> = (0..clustering.centers.len()).collect();
        order.sort_by(|&a, &b| {
            color::luminance(clustering.centers[a]).total_cmp(&color::luminance(clustering.centers[b]))
        });
        let mut remap = vec![0u8; order.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new as u8;
        }
        let palette: Vec<Rgb> = order
            .iter()
            .map(|&old| color::to_rgb(clustering.centers[old]))
            .collect();
        let labels: Vec<u8> = clustering.labels.iter().map(|&l| remap[l as usize]).collect();

        let snapshot = Snapshot::new(cols, rows, palette, labels)?;
        let progress = Progress::fresh(&snapshot);
        let thumbnail =
            export::thumbnail_data_url(&snapshot, &progress, self.config.thumbnail_width)?;

        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_owned(),
            _ => {
                let mut rng = match self.config.seed {
                    Some(seed) => Pcg32::seed_from_u64(seed.wrapping_add(1)),
                    None => Pcg32::seed_from_u64(rand::random()),
                };
                id_generator::generate_title(&mut rng)
            }
        };

        log::info!(
            "Generated board \"{}\": {}x{} cells, {} colors",
            title,
            cols,
            rows,
            snapshot.palette_len()
        );

        let meta = ArtworkMeta {
            id: id_generator::generate_id(),
            title,
            created_at: now,
            updated_at: now,
            cols,
            rows,
            progress_percent: 0,
            thumbnail: Some(thumbnail),
        };

        Ok(GeneratedBoard {
            snapshot,
            progress,
            meta,
        })
    }
}
