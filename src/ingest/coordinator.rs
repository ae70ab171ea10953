//! Fresh decode of a raw-capture container plus artifact persistence.

use std::fs::File;

use tracing::info_span;

use super::artifact::CacheArtifact;
use super::config::IngestConfig;
use super::decode::{CaptureDecoder, DecodeFailure};
use super::error::{IngestError, Result};
use super::image_io::ImageStore;
use super::metadata::{self, CalibrationData};
use super::plane::BayerImage;
use super::source::CaptureSource;
use super::status::StatusSink;

pub struct DecodeCoordinator;

impl DecodeCoordinator {
    /// Opens the source read-only, drives the decoder, and persists the
    /// artifact pair unless an interrupt was signaled. The file handle is
    /// scoped to this call and released on every exit path.
    ///
    /// Returns `Ok(None)` when the source (or its handle) turned out to be
    /// missing; that case is reported through the status sink rather than
    /// surfaced as an error.
    pub fn decode_fresh(
        source: &CaptureSource,
        artifact: &CacheArtifact,
        decoder: &dyn CaptureDecoder,
        store: &dyn ImageStore,
        config: &mut IngestConfig,
        status: &dyn StatusSink,
    ) -> Result<Option<BayerImage>> {
        let mut file = match File::open(source.path()) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::report_missing(source, status);
                return Ok(None);
            }
            // nothing was recognized yet, so an unreadable source is
            // indistinguishable from a non-capture file
            Err(e) => return Err(IngestError::Format(e.to_string())),
        };

        let capture = {
            let _span = info_span!("decode_capture").entered();
            match decoder.decode(&mut file) {
                Ok(capture) => capture,
                Err(DecodeFailure::NotFound(_)) => {
                    Self::report_missing(source, status);
                    return Ok(None);
                }
                Err(DecodeFailure::Unrecognized(e)) => {
                    return Err(IngestError::Format(e.to_string()));
                }
                Err(DecodeFailure::Downstream(e)) => {
                    return Err(IngestError::Processing(e.to_string()));
                }
            }
        };

        // interrupt is polled exactly once, before the cache write, so no
        // partial artifact lands after an external interrupt
        if !status.interrupted() {
            status.message("Save raw image");
            let _span = info_span!("persist_artifact").entered();
            // the capture was recognized by now, so persistence failures
            // are processing failures, whatever their underlying kind
            store
                .save_tiff(&capture.image.to_full_range_u16(), &artifact.image_path)
                .map_err(Self::as_processing)?;
            metadata::save_sidecar(&artifact.sidecar_path, &capture.metadata)
                .map_err(Self::as_processing)?;
            status.progress(100);
        }

        let calibration = CalibrationData::from_value(&capture.metadata)?;
        config.calibration = (!calibration.is_empty()).then_some(calibration);
        Ok(Some(capture.image))
    }

    fn as_processing(err: IngestError) -> IngestError {
        match err {
            IngestError::Processing(_) => err,
            other => IngestError::Processing(other.to_string()),
        }
    }

    fn report_missing(source: &CaptureSource, status: &dyn StatusSink) {
        status.message(&format!("{} not found", source.file_name()));
        status.progress(100);
        status.set_error();
    }
}
