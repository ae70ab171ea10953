//! Sensor-plane buffer types.

/// Single-channel Bayer-plane sensor image.
///
/// Each sample corresponds to one color filter site of the repeating
/// mosaic pattern, prior to any color interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BayerImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Raw pixel data (single channel Bayer pattern)
    pub data: Vec<u16>,
    /// Actual bits per sample from the sensor (e.g., 10, 12, or 16)
    pub bits_per_sample: u32,
}

impl BayerImage {
    /// Largest representable sample value at this bit depth. The depth is
    /// treated as at least one bit so the value is never zero.
    pub fn max_sample(&self) -> u16 {
        ((1u32 << self.bits_per_sample.clamp(1, 16)) - 1) as u16
    }

    /// Rescales the working range to the full unsigned 16-bit range, as
    /// done before the decoded plane is persisted to a typed image file.
    pub fn to_full_range_u16(&self) -> BayerImage {
        if self.bits_per_sample >= 16 {
            return self.clone();
        }
        let scale = u16::MAX as f32 / self.max_sample() as f32;
        let data = self
            .data
            .iter()
            .map(|&v| (v as f32 * scale).round().min(u16::MAX as f32) as u16)
            .collect();
        BayerImage {
            width: self.width,
            height: self.height,
            data,
            bits_per_sample: 16,
        }
    }
}
