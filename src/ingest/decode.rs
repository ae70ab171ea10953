//! Raw-capture decode seam.
//!
//! Parsing of the vendor container is a collaborator concern; this module
//! defines its call contract plus a decoder for bare packed sensor dumps.

use std::fs::File;
use std::io::Read;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::plane::BayerImage;

/// Result of a successful container decode: the sensor plane plus the
/// embedded metadata mapping, still unfiltered.
#[derive(Debug, Clone)]
pub struct DecodedCapture {
    pub image: BayerImage,
    pub metadata: Value,
}

/// Failed decode attempt, tagged with how far the decoder got.
///
/// The tag is what lets the coordinator tell "this file doesn't look like
/// a light-field capture at all" apart from "it was recognized but a later
/// stage broke", without inspecting incidental decoder state.
#[derive(Error, Debug)]
pub enum DecodeFailure {
    /// The source vanished or the handle went stale mid-read.
    #[error("capture file not found: {0}")]
    NotFound(std::io::Error),

    /// Failed before any metadata block was recovered: not a capture.
    #[error("unrecognized capture container: {0}")]
    Unrecognized(anyhow::Error),

    /// Metadata was already recovered when a later stage failed.
    #[error("decode failed after metadata recovery: {0}")]
    Downstream(anyhow::Error),
}

/// Decoder for a raw-capture container.
pub trait CaptureDecoder {
    fn decode(&self, file: &mut File) -> std::result::Result<DecodedCapture, DecodeFailure>;
}

/// Sensor geometry of bare Illum-class dumps.
const BARE_SENSOR_WIDTH: usize = 7728;
const BARE_SENSOR_HEIGHT: usize = 5368;
const BARE_SENSOR_BITS: u32 = 10;

/// Decoder for bare sensor dumps: a headerless stream of packed 10-bit
/// samples at the fixed Illum sensor geometry, with no embedded metadata
/// beyond the defaults implied by the format.
pub struct BareSensorDecoder;

impl CaptureDecoder for BareSensorDecoder {
    fn decode(&self, file: &mut File) -> std::result::Result<DecodedCapture, DecodeFailure> {
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DecodeFailure::NotFound(e)
            } else {
                DecodeFailure::Unrecognized(e.into())
            }
        })?;

        let expected = BARE_SENSOR_WIDTH * BARE_SENSOR_HEIGHT * BARE_SENSOR_BITS as usize / 8;
        if bytes.len() != expected {
            return Err(DecodeFailure::Unrecognized(anyhow::anyhow!(
                "bare sensor dump is {} bytes, expected {expected}",
                bytes.len()
            )));
        }

        debug!(
            width = BARE_SENSOR_WIDTH,
            height = BARE_SENSOR_HEIGHT,
            "unpacking bare sensor dump"
        );
        let data = unpack_raw10(&bytes);
        let metadata = serde_json::json!({
            "bitsPerPixel": BARE_SENSOR_BITS,
            "bayerPattern": "GRBG",
        });
        Ok(DecodedCapture {
            image: BayerImage {
                width: BARE_SENSOR_WIDTH,
                height: BARE_SENSOR_HEIGHT,
                data,
                bits_per_sample: BARE_SENSOR_BITS,
            },
            metadata,
        })
    }
}

/// Unpacks 10-bit samples: each 5-byte group holds four samples as four
/// high bytes followed by one byte of packed 2-bit low parts.
fn unpack_raw10(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len() / 5 * 4);
    for group in bytes.chunks_exact(5) {
        let lows = group[4];
        for (slot, &high) in group[..4].iter().enumerate() {
            let low = (lows >> (slot * 2)) & 0b11;
            out.push((high as u16) << 2 | low as u16);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn unpack_raw10_recovers_samples() {
        // highs 0xFF, 0x00, 0x80, 0x01 with lows 0b11_10_01_00
        let bytes = [0xFF, 0x00, 0x80, 0x01, 0b1110_0100];
        assert_eq!(unpack_raw10(&bytes), vec![0x3FC, 0x001, 0x202, 0x007]);
    }

    #[test]
    fn short_dump_is_unrecognized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.raw");
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        drop(file);

        let mut file = File::open(&path).unwrap();
        let err = BareSensorDecoder.decode(&mut file).unwrap_err();
        assert!(matches!(err, DecodeFailure::Unrecognized(_)));
    }
}
