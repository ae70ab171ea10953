//! Sidecar metadata loading and calibration filtering.
//!
//! Capture metadata arrives either embedded in the raw container or as a
//! JSON sidecar next to a previously decoded artifact. Only a small set
//! of calibration keys is recognized; everything else is dropped before
//! the mapping becomes part of the run's configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::{IngestError, Result};

/// Repeating 2x2 color-filter mosaic layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BayerPattern {
    Rggb,
    Bggr,
    Grbg,
    Gbrg,
}

impl BayerPattern {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "RGGB" => Some(Self::Rggb),
            "BGGR" => Some(Self::Bggr),
            "GRBG" => Some(Self::Grbg),
            "GBRG" => Some(Self::Gbrg),
            _ => None,
        }
    }
}

/// Validated calibration subset of a capture's metadata mapping.
///
/// All fields are optional; an all-`None` value means the image carries no
/// raw-sensor calibration and post-processing is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub bit_depth: Option<u32>,
    pub bayer_pattern: Option<BayerPattern>,
    /// White-balance gains in `[r, gr, gb, b]` order.
    pub awb_gains: Option<[f64; 4]>,
    /// Row-major color correction matrix coefficients.
    pub ccm: Option<Vec<f64>>,
    pub gamma: Option<f64>,
    pub exposure_bias: Option<f64>,
}

impl CalibrationData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Filters a raw metadata mapping down to the recognized calibration
    /// keys. The root must be a JSON object, and any recognized key that
    /// is present with the wrong shape is an error; unrecognized keys are
    /// descended into and otherwise ignored.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(IngestError::Format(
                "metadata root is not a JSON object".into(),
            ));
        }
        let mut out = Self::default();
        visit(value, &mut out)?;
        Ok(out)
    }
}

fn visit(value: &Value, out: &mut CalibrationData) -> Result<()> {
    let Value::Object(map) = value else {
        return Ok(());
    };
    for (key, entry) in map {
        match key.as_str() {
            "bitsPerPixel" | "bit" => out.bit_depth = Some(expect_u32(key, entry)?),
            "bayerPattern" | "bay" => out.bayer_pattern = Some(expect_pattern(key, entry)?),
            "whiteBalanceGain" | "awb" => out.awb_gains = Some(expect_gains(key, entry)?),
            "ccmRgbToSrgbArray" | "ccm" => out.ccm = Some(expect_f64_seq(key, entry)?),
            "gamma" | "gam" => out.gamma = Some(expect_f64(key, entry)?),
            "exposureBias" | "exp" => out.exposure_bias = Some(expect_f64(key, entry)?),
            _ => visit(entry, out)?,
        }
    }
    Ok(())
}

fn shape_error(key: &str) -> IngestError {
    IngestError::Format(format!("metadata key '{key}' has an unexpected shape"))
}

fn expect_u32(key: &str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| shape_error(key))
}

fn expect_f64(key: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| shape_error(key))
}

fn expect_pattern(key: &str, value: &Value) -> Result<BayerPattern> {
    value
        .as_str()
        .and_then(BayerPattern::parse)
        .ok_or_else(|| shape_error(key))
}

fn expect_f64_seq(key: &str, value: &Value) -> Result<Vec<f64>> {
    let Value::Array(items) = value else {
        return Err(shape_error(key));
    };
    items
        .iter()
        .map(|item| item.as_f64().ok_or_else(|| shape_error(key)))
        .collect()
}

fn expect_gains(key: &str, value: &Value) -> Result<[f64; 4]> {
    match value {
        // vendor form: {"r": .., "gr": .., "gb": .., "b": ..}
        Value::Object(map) => {
            let mut gains = [0.0f64; 4];
            for (slot, name) in ["r", "gr", "gb", "b"].iter().enumerate() {
                gains[slot] = map
                    .get(*name)
                    .and_then(Value::as_f64)
                    .ok_or_else(|| shape_error(key))?;
            }
            Ok(gains)
        }
        Value::Array(_) => {
            let seq = expect_f64_seq(key, value)?;
            seq.try_into().map_err(|_| shape_error(key))
        }
        _ => Err(shape_error(key)),
    }
}

/// Mandatory sidecar load for a cache artifact. A missing file is a
/// `NotFound`, unparseable JSON or a wrong-shape mapping is a `Format`
/// error; a cache hit implies the sidecar must exist and be well-formed.
pub fn load_sidecar(path: &Path) -> Result<CalibrationData> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::NotFound(path.display().to_string())
        } else {
            IngestError::Io(e)
        }
    })?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| IngestError::Format(format!("{}: {e}", path.display())))?;
    CalibrationData::from_value(&value)
}

/// Best-effort sidecar load for a generic image, looked up next to the
/// image as `<stem>.json`. Absence of calibration is a legal, silent
/// outcome, and any failure here (missing or malformed alike) collapses
/// into `None`. This is the only place a failure is swallowed.
pub fn load_optional_sidecar(image_path: &Path) -> Option<CalibrationData> {
    let sidecar = image_path.with_extension("json");
    match load_sidecar(&sidecar) {
        Ok(calibration) if !calibration.is_empty() => Some(calibration),
        Ok(_) => None,
        Err(e) => {
            debug!("no usable sidecar at {}: {e}", sidecar.display());
            None
        }
    }
}

/// Persists the full metadata mapping of a fresh decode next to its
/// cached image, for reuse on later runs.
pub fn save_sidecar(path: &Path, metadata: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, metadata)
        .map_err(|e| IngestError::Processing(format!("failed to write sidecar: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_collects_nested_calibration_keys() {
        let value = json!({
            "image": {
                "rawDetails": { "bitsPerPixel": 10 },
                "color": {
                    "gamma": 0.4166,
                    "whiteBalanceGain": { "r": 1.6, "gr": 1.0, "gb": 1.0, "b": 1.2 }
                },
                "bayerPattern": "GRBG"
            },
            "camera": { "serialNumber": "B5151900xxx" }
        });
        let calibration = CalibrationData::from_value(&value).unwrap();
        assert_eq!(calibration.bit_depth, Some(10));
        assert_eq!(calibration.bayer_pattern, Some(BayerPattern::Grbg));
        assert_eq!(calibration.awb_gains, Some([1.6, 1.0, 1.0, 1.2]));
        assert_eq!(calibration.gamma, Some(0.4166));
        assert!(calibration.ccm.is_none());
    }

    #[test]
    fn non_object_root_is_a_format_error() {
        let err = CalibrationData::from_value(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, IngestError::Format(_)));
    }

    #[test]
    fn wrong_typed_recognized_key_is_a_format_error() {
        let err = CalibrationData::from_value(&json!({ "bitsPerPixel": "ten" })).unwrap_err();
        assert!(matches!(err, IngestError::Format(_)));
    }

    #[test]
    fn gains_accept_array_form() {
        let calibration =
            CalibrationData::from_value(&json!({ "awb": [2.0, 1.0, 1.0, 1.5] })).unwrap();
        assert_eq!(calibration.awb_gains, Some([2.0, 1.0, 1.0, 1.5]));
    }

    #[test]
    fn unrecognized_keys_are_dropped() {
        let calibration =
            CalibrationData::from_value(&json!({ "thumbnails": [1, 2], "modeName": "x" }))
                .unwrap();
        assert!(calibration.is_empty());
    }

    #[test]
    fn optional_sidecar_absence_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_optional_sidecar(&dir.path().join("photo.jpg")).is_none());
    }

    #[test]
    fn optional_sidecar_swallows_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("photo.jpg");
        std::fs::write(image.with_extension("json"), "{ not json").unwrap();
        assert!(load_optional_sidecar(&image).is_none());
    }

    #[test]
    fn mandatory_sidecar_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sidecar(&dir.path().join("shot.json")).unwrap_err();
        assert!(matches!(err, IngestError::NotFound(_)));
    }
}
