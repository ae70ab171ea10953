//! Light-field capture ingestion module
//!
//! This module resolves how a capture file is stored, decides between a
//! fresh decode and reuse of a previously decoded artifact pair, and runs
//! the post-decode normalization stages on the raw Bayer plane.

pub mod artifact;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod decode;
pub mod error;
pub mod image_io;
pub mod metadata;
pub mod plane;
pub mod postprocess;
pub mod reader;
pub mod source;
pub mod status;


pub use artifact::CacheArtifact;

pub use cache::{
    CacheGate,
    CacheOutcome,
};

pub use config::IngestConfig;

pub use coordinator::DecodeCoordinator;

pub use decode::{
    BareSensorDecoder,
    CaptureDecoder,
    DecodeFailure,
    DecodedCapture,
};

pub use error::{
    IngestError,
    Result,
};

pub use image_io::{
    DiskImageStore,
    ImageStore,
};

pub use metadata::{
    BayerPattern,
    CalibrationData,
};

pub use plane::BayerImage;

pub use postprocess::PostProcessPipeline;

pub use reader::CaptureReader;

pub use source::{
    CaptureSource,
    ContainerKind,
};

pub use status::{
    StatusSink,
    TracingStatus,
};
