//! Reuse-vs-decode decision for previously decoded artifacts.

use tracing::{debug, info};

use super::artifact::CacheArtifact;
use super::config::IngestConfig;
use super::error::{IngestError, Result};
use super::image_io::ImageStore;
use super::metadata::{self, CalibrationData};
use super::plane::BayerImage;
use super::status::StatusSink;

/// Outcome of the cache gate for a raw-capture source.
pub enum CacheOutcome {
    /// The artifact pair loaded; decoding is skipped.
    Hit(BayerImage),
    /// A required artifact file went missing during the reuse attempt.
    /// Already reported through the status sink; the run yields no image.
    Unavailable,
    /// No artifact on disk; the caller must decode fresh.
    Miss,
}

pub struct CacheGate;

impl CacheGate {
    /// Attempts reuse of the artifact pair. A structurally broken artifact
    /// (unreadable image, unparseable or wrong-shape sidecar) is a
    /// `Format` error surfaced to the caller; a file missing mid-attempt
    /// is reported and downgraded to `Unavailable`.
    pub fn run(
        artifact: &CacheArtifact,
        store: &dyn ImageStore,
        config: &mut IngestConfig,
        status: &dyn StatusSink,
        source_name: &str,
    ) -> Result<CacheOutcome> {
        if !artifact.image_path.exists() {
            debug!("no cached artifact at {}", artifact.image_path.display());
            return Ok(CacheOutcome::Miss);
        }

        match Self::load_pair(artifact, store) {
            Ok((image, calibration)) => {
                info!("reusing decoded artifact {}", artifact.image_path.display());
                config.calibration = calibration;
                Ok(CacheOutcome::Hit(image))
            }
            Err(IngestError::NotFound(_)) => {
                status.message(&format!("{source_name} not found"));
                status.progress(100);
                status.set_error();
                Ok(CacheOutcome::Unavailable)
            }
            Err(IngestError::Format(msg)) => {
                status.message(&msg);
                status.progress(100);
                status.set_error();
                Err(IngestError::Format(msg))
            }
            Err(other) => Err(other),
        }
    }

    fn load_pair(
        artifact: &CacheArtifact,
        store: &dyn ImageStore,
    ) -> Result<(BayerImage, Option<CalibrationData>)> {
        let image = store.load(&artifact.image_path)?;
        // a cache hit implies the sidecar must exist and be well-formed
        let calibration = metadata::load_sidecar(&artifact.sidecar_path)?;
        Ok((image, (!calibration.is_empty()).then_some(calibration)))
    }
}
