//! Explicit per-run configuration context.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{IngestError, Result};
use super::metadata::CalibrationData;

/// Configuration and parameter state for one ingestion run.
///
/// Passed by reference through the pipeline instead of living as ambient
/// shared state; the calibration field is written at most once per
/// successful metadata load. Not meant to be shared across concurrent
/// ingestions of different sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Calibration recovered from the capture, if any. `Some` marks the
    /// decoded buffer as raw sensor data and enables post-processing.
    pub calibration: Option<CalibrationData>,
    /// Where to persist run parameters at the end of orchestration.
    /// `None` skips persistence.
    pub params_path: Option<PathBuf>,
}

impl IngestConfig {
    /// Persists the run parameters as JSON. Called exactly once, at the
    /// end of orchestration.
    pub fn save_params(&self) -> Result<()> {
        let Some(path) = &self.params_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| IngestError::Processing(format!("failed to persist parameters: {e}")))?;
        debug!("parameters saved to {}", path.display());
        Ok(())
    }
}
