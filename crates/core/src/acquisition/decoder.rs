use tracing::debug;

use super::AcquisitionError;

/// Still-image QR decoder.
pub trait QrDecoder: Send + Sync {
    /// Returns the name of this decoder implementation.
    fn name(&self) -> &str;

    /// Decode the first QR code found in an encoded image (PNG, JPEG).
    ///
    /// `Ok(None)` means the image loaded but holds no readable code;
    /// `Err` means the bytes are not an image at all.
    fn decode(&self, image: &[u8]) -> Result<Option<String>, AcquisitionError>;
}

/// Decoder built on `rqrr` grid detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    fn name(&self) -> &str {
        "rqrr"
    }

    fn decode(&self, image: &[u8]) -> Result<Option<String>, AcquisitionError> {
        let loaded = image::load_from_memory(image)
            .map_err(|e| AcquisitionError::InvalidImage(e.to_string()))?;
        let luma = loaded.to_luma8();
        let (width, height) = luma.dimensions();

        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                luma.get_pixel(x as u32, y as u32).0[0]
            });

        let grids = prepared.detect_grids();
        debug!("Detected {} QR grid(s) in {}x{} image", grids.len(), width, height);

        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => return Ok(Some(content)),
                Err(e) => debug!("QR grid failed to decode: {}", e),
            }
        }

        Ok(None)
    }
}
