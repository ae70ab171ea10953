//! Cache artifact path derivation.

use std::path::{Path, PathBuf};

/// Locator for the previously decoded artifact pair of a capture.
///
/// Derivation is pure and idempotent: the image lands in a directory named
/// after the source's stem, as `<stem>/<stem>.tiff`, with the metadata
/// sidecar next to it as `<stem>/<stem>.json`. This pairing is the only
/// durable on-disk format and must stay stable across versions so older
/// caches remain readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheArtifact {
    /// Directory named after the source stem.
    pub stem_dir: PathBuf,
    /// Base name of the decoded image file.
    pub file_name: String,
    /// Full path of the decoded image inside `stem_dir`.
    pub image_path: PathBuf,
    /// Full path of the metadata sidecar inside `stem_dir`.
    pub sidecar_path: PathBuf,
}

impl CacheArtifact {
    /// Derives the artifact locator from a source path. Accepts any path,
    /// including non-existent ones; no filesystem access happens here.
    pub fn derive(source: &Path) -> Self {
        let stem_dir = source.with_extension("");
        let stem = stem_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{stem}.tiff");
        let image_path = stem_dir.join(&file_name);
        let sidecar_path = stem_dir.join(format!("{stem}.json"));
        Self {
            stem_dir,
            file_name,
            image_path,
            sidecar_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_artifact_under_stem_directory() {
        let artifact = CacheArtifact::derive(Path::new("captures/shot.lfr"));
        assert_eq!(artifact.stem_dir, Path::new("captures/shot"));
        assert_eq!(artifact.file_name, "shot.tiff");
        assert_eq!(artifact.image_path, Path::new("captures/shot/shot.tiff"));
        assert_eq!(artifact.sidecar_path, Path::new("captures/shot/shot.json"));
    }

    #[test]
    fn derivation_is_idempotent() {
        let path = Path::new("a/b/c/shot.lfp");
        assert_eq!(CacheArtifact::derive(path), CacheArtifact::derive(path));
    }

    #[test]
    fn accepts_extensionless_paths() {
        let artifact = CacheArtifact::derive(Path::new("shot"));
        assert_eq!(artifact.image_path, Path::new("shot/shot.tiff"));
    }
}
