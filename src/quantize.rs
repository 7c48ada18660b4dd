//! Color quantization: k-means++ seeding followed by a fixed number of
//! Lloyd iterations in RGB space.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::color::{self, Rgb, RgbF};
use crate::error::QuantizeError;

pub const MIN_COLORS: usize = 2;
pub const MAX_COLORS: usize = 48;
pub const MIN_ITERATIONS: usize = 3;
pub const MAX_ITERATIONS: usize = 30;

/// Result of clustering: `centers[labels[i]]` is the representative of point `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub centers: Vec<RgbF>,
    pub labels: Vec<u8>,
}

/// Clusters colors into `k` representatives.
#[derive(Debug, Clone)]
pub struct Quantizer {
    k: usize,
    iterations: usize,
    rng: Pcg32,
}

impl Quantizer {
    /// Creates a quantizer seeded from entropy; results vary between runs.
    pub fn new(k: usize, iterations: usize) -> Self {
        Self::with_seed(k, iterations, rand::random())
    }

    /// Creates a quantizer whose output is reproducible for the same input.
    pub fn with_seed(k: usize, iterations: usize, seed: u64) -> Self {
        Self {
            k: k.clamp(MIN_COLORS, MAX_COLORS),
            iterations: iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn quantize(&mut self, points: &[Rgb]) -> Result<Clustering, QuantizeError> {
        if points.is_empty() {
            return Err(QuantizeError::NoPoints);
        }
        let points: Vec<RgbF> = points.iter().copied().map(color::to_f64).collect();

        let mut centers = self.seed_centers(&points);
        let mut labels = vec![0u8; points.len()];

        for _ in 0..self.iterations {
            assign(&points, &centers, &mut labels);
            update_centers(&points, &labels, &mut centers);
        }

        Ok(Clustering { centers, labels })
    }

    /// k-means++ seeding
    fn seed_centers(&mut self, points: &[RgbF]) -> Vec<RgbF> {
        let mut centers = Vec::with_capacity(self.k);
        centers.push(points[self.rng.random_range(0..points.len())]);

        // Squared distance of every point to its nearest chosen center
        let mut nearest: Vec<f64> = points
            .iter()
            .map(|p| color::distance_sq(*p, centers[0]))
            .collect();

        while centers.len() < self.k {
            let total: f64 = nearest.iter().sum();
            let next = if total > 0.0 {
                self.weighted_pick(&nearest, total)
            } else {
                // Fewer distinct colors than k
                self.rng.random_range(0..points.len())
            };
            let center = points[next];
            centers.push(center);

            for (d, p) in nearest.iter_mut().zip(points) {
                *d = d.min(color::distance_sq(*p, center));
            }
        }
        centers
    }

    fn weighted_pick(&mut self, weights: &[f64], total: f64) -> usize {
        let mut r = self.rng.random::<f64>() * total;
        let mut last_positive = 0;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            if r < w {
                return i;
            }
            r -= w;
            last_positive = i;
        }
        // Floating point leftovers land on the last candidate
        last_positive
    }
}

/// Assigns every point to its nearest center; ties go to the lowest index.
fn assign(points: &[RgbF], centers: &[RgbF], labels: &mut [u8]) {
    for (label, p) in labels.iter_mut().zip(points) {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (c, center) in centers.iter().enumerate() {
            let d = color::distance_sq(*p, *center);
            if d < best_d {
                best_d = d;
                best = c;
            }
        }
        *label = best as u8;
    }
}

/// Moves each center to the mean of its points. Empty clusters stay put.
fn update_centers(points: &[RgbF], labels: &[u8], centers: &mut [RgbF]) {
    let mut sums = vec![[0.0f64; 4]; centers.len()];
    for (p, &label) in points.iter().zip(labels) {
        let s = &mut sums[label as usize];
        s[0] += p[0];
        s[1] += p[1];
        s[2] += p[2];
        s[3] += 1.0;
    }
    for (center, s) in centers.iter_mut().zip(&sums) {
        if s[3] > 0.0 {
            *center = [s[0] / s[3], s[1] / s[3], s[2] / s[3]];
        }
    }
}
