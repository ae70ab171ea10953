//! Input classification for capture files.

use std::path::{Path, PathBuf};

/// Extensions of vendor raw-capture containers (and bare sensor dumps).
pub const RAW_CAPTURE_EXTENSIONS: [&str; 3] = ["lfp", "lfr", "raw"];

/// Storage form of an input file, derived once from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Vendor binary container holding an undemosaiced sensor image plus
    /// embedded calibration metadata.
    RawCapture,
    /// Any other image file, handled by generic image I/O.
    GenericImage,
}

/// Immutable reference to an input file plus its container classification.
#[derive(Debug, Clone)]
pub struct CaptureSource {
    path: PathBuf,
    kind: ContainerKind,
}

impl CaptureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if RAW_CAPTURE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known)) =>
            {
                ContainerKind::RawCapture
            }
            _ => ContainerKind::GenericImage,
        };
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Base name used in status messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
