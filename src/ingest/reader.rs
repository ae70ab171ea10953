//! Ingestion orchestration.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use super::artifact::CacheArtifact;
use super::cache::{CacheGate, CacheOutcome};
use super::config::IngestConfig;
use super::coordinator::DecodeCoordinator;
use super::decode::{BareSensorDecoder, CaptureDecoder};
use super::error::{IngestError, Result};
use super::image_io::{DiskImageStore, ImageStore};
use super::metadata;
use super::plane::BayerImage;
use super::postprocess::PostProcessPipeline;
use super::source::{CaptureSource, ContainerKind};
use super::status::{StatusSink, TracingStatus};

/// Orchestrates one end-to-end ingestion of a capture file.
///
/// Sequences classification, the cache gate (with fresh decode on a
/// miss), generic-image loading, post-processing, and parameter
/// persistence. Owns the decoded image for the duration of the run and
/// exposes it afterwards through [`CaptureReader::image`].
pub struct CaptureReader<D: CaptureDecoder, S: ImageStore> {
    source: CaptureSource,
    artifact: CacheArtifact,
    decoder: D,
    store: S,
    config: IngestConfig,
    status: Arc<dyn StatusSink>,
    image: Option<BayerImage>,
}

impl CaptureReader<BareSensorDecoder, DiskImageStore> {
    /// Reader with the default collaborators: bare sensor dump decoding,
    /// filesystem-backed image I/O, and tracing-backed status.
    pub fn new(path: impl AsRef<Path>, config: IngestConfig) -> Self {
        Self::with_custom(
            path,
            BareSensorDecoder,
            DiskImageStore,
            config,
            Arc::new(TracingStatus::new()),
        )
    }
}

impl<D: CaptureDecoder, S: ImageStore> CaptureReader<D, S> {
    pub fn with_custom(
        path: impl AsRef<Path>,
        decoder: D,
        store: S,
        config: IngestConfig,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        let source = CaptureSource::new(path.as_ref());
        let artifact = CacheArtifact::derive(source.path());
        Self {
            source,
            artifact,
            decoder,
            store,
            config,
            status,
            image: None,
        }
    }

    /// Runs the full ingestion flow.
    ///
    /// A missing input or cache file is reported through the status sink
    /// (message, progress forced to 100, error flag) and leaves the run
    /// without an image but still returns `Ok`; format and processing
    /// failures propagate as typed errors.
    #[instrument(skip(self), fields(path = %self.source.path().display()))]
    pub fn run(&mut self) -> Result<bool> {
        info!("Starting capture ingestion");

        match self.source.kind() {
            ContainerKind::RawCapture => self.ingest_raw_capture()?,
            ContainerKind::GenericImage => self.ingest_generic_image()?,
        }

        if let Some(image) = self.image.as_ref() {
            if let Some(corrected) = PostProcessPipeline::run(
                image,
                self.config.calibration.as_ref(),
                self.status.as_ref(),
            )? {
                self.image = Some(corrected);
            }
        }

        self.config.save_params()?;

        info!(
            decoded = self.image.is_some(),
            errored = self.status.has_error(),
            "Ingestion complete"
        );
        Ok(true)
    }

    fn ingest_raw_capture(&mut self) -> Result<()> {
        self.image = match CacheGate::run(
            &self.artifact,
            &self.store,
            &mut self.config,
            self.status.as_ref(),
            &self.source.file_name(),
        )? {
            CacheOutcome::Hit(image) => Some(image),
            CacheOutcome::Unavailable => None,
            CacheOutcome::Miss => DecodeCoordinator::decode_fresh(
                &self.source,
                &self.artifact,
                &self.decoder,
                &self.store,
                &mut self.config,
                self.status.as_ref(),
            )?,
        };
        Ok(())
    }

    fn ingest_generic_image(&mut self) -> Result<()> {
        match self.store.load(self.source.path()) {
            Ok(image) => {
                // absence of a sidecar (or a malformed one) is legal here
                self.config.calibration = metadata::load_optional_sidecar(self.source.path());
                self.image = Some(image);
                Ok(())
            }
            Err(IngestError::NotFound(_)) => {
                self.status
                    .message(&format!("{} not found", self.source.file_name()));
                self.status.progress(100);
                self.status.set_error();
                Ok(())
            }
            Err(IngestError::Format(msg)) => {
                self.status.message("File type not recognized");
                self.status.set_interrupt();
                Err(IngestError::Format(msg))
            }
            Err(other) => Err(other),
        }
    }

    /// Final decoded (and possibly corrected) image, if the run produced one.
    pub fn image(&self) -> Option<&BayerImage> {
        self.image.as_ref()
    }

    /// Hands the decoded image to the caller, leaving the reader empty.
    pub fn take_image(&mut self) -> Option<BayerImage> {
        self.image.take()
    }

    pub fn source(&self) -> &CaptureSource {
        &self.source
    }

    pub fn artifact(&self) -> &CacheArtifact {
        &self.artifact
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn status(&self) -> &Arc<dyn StatusSink> {
        &self.status
    }
}
