//! Raster output: the printable board, gallery thumbnails and a pixelated
//! preview of a source picture.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::board;
use crate::color::{LABEL_INK, Rgb, WHITE};
use crate::document::{Progress, Snapshot};
use crate::error::ExportError;
use crate::state::codec;

const GRID_INK: Rgb = [0, 0, 0];

/// 3x5 digit glyphs, one row per byte, high bit on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Edge length of one cell in output pixels
    pub cell_px: u32,
    /// Draw 1px black lines between cells
    pub grid: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            cell_px: 24,
            grid: true,
        }
    }
}

/// Renders the board: filled cells in their color, open cells white with
/// their 1-based number.
pub fn render_board(snapshot: &Snapshot, progress: &Progress, options: &ExportOptions) -> RgbImage {
    let cell = options.cell_px.max(1);
    let cols = snapshot.cols();
    let rows = snapshot.rows();
    let mut out = RgbImage::from_pixel(cols * cell, rows * cell, image::Rgb(WHITE));

    for index in 0..snapshot.cell_count() {
        let (x, y) = snapshot.coords_of(index);
        let (x0, y0) = (x as u32 * cell, y as u32 * cell);
        let Some(label) = snapshot.label(index) else {
            continue;
        };
        if progress.is_filled(index) {
            fill_rect(&mut out, x0, y0, cell, cell, snapshot.palette()[label]);
        } else {
            draw_number(&mut out, x0, y0, cell, label + 1);
        }
    }

    if options.grid {
        let (width, height) = out.dimensions();
        for gx in (0..=cols).map(|c| (c * cell).min(width - 1)) {
            fill_rect(&mut out, gx, 0, 1, height, GRID_INK);
        }
        for gy in (0..=rows).map(|r| (r * cell).min(height - 1)) {
            fill_rect(&mut out, 0, gy, width, 1, GRID_INK);
        }
    }
    out
}

/// Small preview: one pixel per cell, scaled to `width` without smoothing.
pub fn render_thumbnail(snapshot: &Snapshot, progress: &Progress, width: u32) -> RgbImage {
    let cols = snapshot.cols();
    let rows = snapshot.rows();
    let base = RgbImage::from_fn(cols, rows, |x, y| {
        let index = y as usize * cols as usize + x as usize;
        match snapshot.label(index) {
            Some(label) if progress.is_filled(index) => image::Rgb(snapshot.palette()[label]),
            _ => image::Rgb(WHITE),
        }
    });
    let width = width.max(1);
    let height = ((rows as f64 * width as f64 / cols as f64).round() as u32).max(1);
    imageops::resize(&base, width, height, FilterType::Nearest)
}

/// Thumbnail as a `data:image/png;base64,...` URL
pub fn thumbnail_data_url(
    snapshot: &Snapshot,
    progress: &Progress,
    width: u32,
) -> Result<String, ExportError> {
    let png = encode_png(&render_thumbnail(snapshot, progress, width))?;
    Ok(format!("data:image/png;base64,{}", codec::encode_bytes(&png)))
}

/// Downsamples the source to the board grid, then blows each cell back up
/// to `cell_px` square pixels.
pub fn pixelate_source(image: &RgbaImage, cells_across: u32, cell_px: u32) -> RgbaImage {
    let small = board::downsample(image, cells_across);
    let cell = cell_px.max(1);
    imageops::resize(
        &small,
        small.width() * cell,
        small.height() * cell,
        FilterType::Nearest,
    )
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

pub fn write_png(path: impl AsRef<Path>, image: &RgbImage) -> Result<(), ExportError> {
    let path = path.as_ref();
    std::fs::write(path, encode_png(image)?)?;
    log::info!("Wrote {}x{} PNG to {}", image.width(), image.height(), path.display());
    Ok(())
}

fn fill_rect(image: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb) {
    let x1 = (x0 + w).min(image.width());
    let y1 = (y0 + h).min(image.height());
    for y in y0..y1 {
        for x in x0..x1 {
            image.put_pixel(x, y, image::Rgb(color));
        }
    }
}

/// Prints `number` centered in a cell; skipped if it does not fit.
fn draw_number(image: &mut RgbImage, x0: u32, y0: u32, cell: u32, number: usize) {
    let digits: Vec<usize> = number
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();
    let scale = (cell / 10).max(1);
    let n = digits.len() as u32;
    let text_w = (n * GLYPH_W + (n - 1)) * scale;
    let text_h = GLYPH_H * scale;
    // Leave a pixel on each side for the grid
    if text_w + 2 > cell || text_h + 2 > cell {
        return;
    }

    let mut gx = x0 + (cell - text_w) / 2;
    let gy = y0 + (cell - text_h) / 2;
    for digit in digits {
        for (row, bits) in DIGITS[digit].iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) != 0 {
                    fill_rect(
                        image,
                        gx + col * scale,
                        gy + row as u32 * scale,
                        scale,
                        scale,
                        LABEL_INK,
                    );
                }
            }
        }
        gx += (GLYPH_W + 1) * scale;
    }
}
