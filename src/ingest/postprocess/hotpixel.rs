//! Statistical hot-pixel detection and replacement on a Bayer plane.

use tracing::debug;

use crate::ingest::plane::BayerImage;

/// Replaces sensor sites whose value is a statistical outlier against
/// their same-filter neighborhood.
///
/// Neighborhood statistics only ever mix samples from the same color
/// filter, so neighbors sit two sites apart in each direction. Detection
/// reads from the unmodified input throughout; replacements are written
/// to the working copy only.
pub struct HotPixelRectifier {
    window: usize,
    sig_level: f64,
}

impl HotPixelRectifier {
    pub fn new(window: usize, sig_level: f64) -> Self {
        Self { window, sig_level }
    }

    /// Takes ownership of a working copy and returns it rectified.
    pub fn rectify(&self, mut image: BayerImage) -> BayerImage {
        let half = (self.window / 2) as isize;
        let (w, h) = (image.width as isize, image.height as isize);
        let original = image.data.clone();
        let mut replaced = 0usize;

        for row in 0..h {
            for col in 0..w {
                let mut neighbors: Vec<f64> = Vec::with_capacity(self.window * self.window - 1);
                for dr in -half..=half {
                    for dc in -half..=half {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let (r, c) = (row + dr * 2, col + dc * 2);
                        if r < 0 || r >= h || c < 0 || c >= w {
                            continue;
                        }
                        neighbors.push(original[(r * w + c) as usize] as f64);
                    }
                }
                if neighbors.len() < 3 {
                    continue;
                }

                let mean = neighbors.iter().sum::<f64>() / neighbors.len() as f64;
                let var = neighbors.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / neighbors.len() as f64;
                let center = original[(row * w + col) as usize] as f64;

                if (center - mean).abs() > self.sig_level * var.sqrt() {
                    neighbors.sort_by(|a, b| a.total_cmp(b));
                    let median = neighbors[neighbors.len() / 2];
                    image.data[(row * w + col) as usize] = median.round() as u16;
                    replaced += 1;
                }
            }
        }

        debug!(replaced, "hot pixel rectification complete");
        image
    }
}
