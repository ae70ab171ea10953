use lfp_ingest::ingest::{CaptureReader, IngestConfig};
use lfp_ingest::logger;

use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init();

    info!("Starting lfp_ingest...");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "capture.lfr".to_string());

    let mut reader = CaptureReader::new(&path, IngestConfig::default());
    match reader.run() {
        Ok(_) => match reader.image() {
            Some(image) => info!(
                width = image.width,
                height = image.height,
                bits = image.bits_per_sample,
                "Ingestion successful"
            ),
            None => error!("Ingestion finished without an image"),
        },
        Err(e) => error!("Ingestion failed: {}", e),
    }

    Ok(())
}
