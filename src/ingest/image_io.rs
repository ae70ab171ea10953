//! Generic image loading and cache artifact writing.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use super::error::{IngestError, Result};
use super::plane::BayerImage;

/// Image store seam: generic-format loading plus Gray16 TIFF writing for
/// the cache artifact.
pub trait ImageStore {
    /// Loads any supported image file as a single-channel 16-bit plane.
    /// A missing file maps to `NotFound`; unsupported or undecodable
    /// content maps to `Format`.
    fn load(&self, path: &Path) -> Result<BayerImage>;

    /// Writes the plane as an uncompressed Gray16 TIFF, creating parent
    /// directories as needed.
    fn save_tiff(&self, image: &BayerImage, path: &Path) -> Result<()>;
}

/// Filesystem-backed store used outside of tests.
pub struct DiskImageStore;

impl ImageStore for DiskImageStore {
    fn load(&self, path: &Path) -> Result<BayerImage> {
        debug!("Loading image {}", path.display());
        let dynamic = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                IngestError::NotFound(path.display().to_string())
            }
            other => IngestError::Format(other.to_string()),
        })?;
        let gray = dynamic.to_luma16();
        Ok(BayerImage {
            width: gray.width() as usize,
            height: gray.height() as usize,
            data: gray.into_raw(),
            bits_per_sample: 16,
        })
    }

    fn save_tiff(&self, image: &BayerImage, path: &Path) -> Result<()> {
        debug!(
            "Encoding TIFF image: {}x{} to {}",
            image.width,
            image.height,
            path.display()
        );
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut encoder = tiff::encoder::TiffEncoder::new(BufWriter::new(file))
            .map_err(|e| IngestError::Processing(format!("tiff encoder: {e}")))?;
        encoder
            .write_image::<tiff::encoder::colortype::Gray16>(
                image.width as u32,
                image.height as u32,
                &image.data,
            )
            .map_err(|e| IngestError::Processing(format!("tiff encode: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_plane() -> BayerImage {
        BayerImage {
            width: 4,
            height: 2,
            data: (0..8).map(|v| v * 1000).collect(),
            bits_per_sample: 16,
        }
    }

    #[test]
    fn tiff_round_trips_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/shot.tiff");
        let plane = test_plane();

        DiskImageStore.save_tiff(&plane, &path).unwrap();
        let restored = DiskImageStore.load(&path).unwrap();
        assert_eq!(restored, plane);
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DiskImageStore.load(&dir.path().join("absent.tiff")).unwrap_err();
        assert!(matches!(err, IngestError::NotFound(_)));
    }

    #[test]
    fn undecodable_content_maps_to_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        let err = DiskImageStore.load(&path).unwrap_err();
        assert!(matches!(err, IngestError::Format(_)));
    }
}
