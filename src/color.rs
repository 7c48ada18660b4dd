/// An 8-bit sRGB color as stored in palettes and records.
pub type Rgb = [u8; 3];

/// A color in continuous RGB space, used while clustering.
pub type RgbF = [f64; 3];

/// Pure white, used for unfilled cells.
pub const WHITE: Rgb = [255, 255, 255];

/// Dark slate used for printed label numbers.
pub const LABEL_INK: Rgb = [0x1f, 0x29, 0x37];

/// Relative luminance weights (Rec. 709).
pub fn luminance(c: RgbF) -> f64 {
    0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2]
}

/// Squared Euclidean distance in RGB space
#[inline]
pub fn distance_sq(a: RgbF, b: RgbF) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

pub fn to_f64(c: Rgb) -> RgbF {
    [c[0] as f64, c[1] as f64, c[2] as f64]
}

/// Rounds a continuous color back into 8-bit channels.
pub fn to_rgb(c: RgbF) -> Rgb {
    c.map(|v| v.round().clamp(0.0, 255.0) as u8)
}
