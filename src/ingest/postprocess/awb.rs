//! Clipping-safe automatic white balance on the Bayer plane.

use tracing::debug;

use crate::ingest::metadata::{BayerPattern, CalibrationData};
use crate::ingest::plane::BayerImage;

/// Applies per-channel white-balance gains directly to the mosaic sites.
///
/// Gains are rescaled so the largest channel gain is unity; the
/// correction only ever attenuates and cannot push samples past the
/// sensor's saturation level.
pub struct BayerWhiteBalance {
    /// Gain per 2x2 mosaic site, indexed by `(row & 1) * 2 + (col & 1)`.
    site_gains: [f64; 4],
}

impl BayerWhiteBalance {
    /// Builds the correction from calibration data. Returns `None` when
    /// no white-balance gains are present; the pattern defaults to RGGB
    /// when the calibration does not name one.
    pub fn from_calibration(calibration: &CalibrationData) -> Option<Self> {
        let gains = calibration.awb_gains?;
        let pattern = calibration.bayer_pattern.unwrap_or(BayerPattern::Rggb);
        let site_gains = site_gains(pattern, gains);

        let max = site_gains.iter().fold(f64::MIN, |a, &b| a.max(b));
        if max <= 0.0 {
            return None;
        }
        Some(Self {
            site_gains: site_gains.map(|g| g / max),
        })
    }

    pub fn apply(&self, mut image: BayerImage) -> BayerImage {
        debug!(gains = ?self.site_gains, "applying bayer white balance");
        let limit = image.max_sample() as f64;
        let width = image.width;
        for row in 0..image.height {
            for col in 0..width {
                let gain = self.site_gains[(row & 1) * 2 + (col & 1)];
                let v = image.data[row * width + col] as f64 * gain;
                image.data[row * width + col] = v.min(limit).round() as u16;
            }
        }
        image
    }
}

/// Maps `[r, gr, gb, b]` gains onto the 2x2 mosaic sites of a pattern.
fn site_gains(pattern: BayerPattern, [r, gr, gb, b]: [f64; 4]) -> [f64; 4] {
    match pattern {
        BayerPattern::Rggb => [r, gr, gb, b],
        BayerPattern::Bggr => [b, gb, gr, r],
        BayerPattern::Grbg => [gr, r, b, gb],
        BayerPattern::Gbrg => [gb, b, r, gr],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration(pattern: Option<BayerPattern>, gains: [f64; 4]) -> CalibrationData {
        CalibrationData {
            bayer_pattern: pattern,
            awb_gains: Some(gains),
            ..Default::default()
        }
    }

    #[test]
    fn absent_gains_yield_no_correction() {
        assert!(BayerWhiteBalance::from_calibration(&CalibrationData::default()).is_none());
    }

    #[test]
    fn gains_are_rescaled_to_unity_maximum() {
        let wb = BayerWhiteBalance::from_calibration(&calibration(
            Some(BayerPattern::Rggb),
            [2.0, 1.0, 1.0, 1.5],
        ))
        .unwrap();

        let image = BayerImage {
            width: 2,
            height: 2,
            data: vec![400; 4],
            bits_per_sample: 10,
        };
        let out = wb.apply(image);
        // red site keeps full value, the rest attenuate
        assert_eq!(out.data, vec![400, 200, 200, 300]);
    }

    #[test]
    fn pattern_reorders_site_gains() {
        let wb = BayerWhiteBalance::from_calibration(&calibration(
            Some(BayerPattern::Bggr),
            [2.0, 1.0, 1.0, 1.0],
        ))
        .unwrap();

        let image = BayerImage {
            width: 2,
            height: 2,
            data: vec![400; 4],
            bits_per_sample: 10,
        };
        let out = wb.apply(image);
        // red sits at the bottom-right site under BGGR
        assert_eq!(out.data, vec![200, 200, 200, 400]);
    }

    #[test]
    fn correction_never_exceeds_saturation() {
        let wb = BayerWhiteBalance::from_calibration(&calibration(
            Some(BayerPattern::Rggb),
            [1.0, 1.0, 1.0, 1.0],
        ))
        .unwrap();
        let image = BayerImage {
            width: 2,
            height: 2,
            data: vec![1023; 4],
            bits_per_sample: 10,
        };
        assert_eq!(wb.apply(image).data, vec![1023; 4]);
    }
}
