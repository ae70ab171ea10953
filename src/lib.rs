//! Light-field capture ingestion pipeline.
//!
//! Resolves how a capture is stored, reuses previously decoded artifacts
//! where possible, and normalizes raw sensor data into a corrected
//! Bayer-plane image.

pub mod ingest;
pub mod logger;

pub use ingest::{
    BayerImage,
    CacheArtifact,
    CaptureDecoder,
    CaptureReader,
    CaptureSource,
    ContainerKind,
    DiskImageStore,
    ImageStore,
    IngestConfig,
    IngestError,
    Result,
    StatusSink,
    TracingStatus,
};
