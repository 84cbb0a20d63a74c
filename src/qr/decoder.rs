//! QR code decoder using rqrr

use crate::error::{Error, Result};
use crate::qr::QrPayload;
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// QR code decoder
#[derive(Debug, Clone, Default)]
pub struct QrDecoder;

impl QrDecoder {
    /// Create a new QR decoder
    pub fn new() -> Self {
        Self
    }

    /// Open an image file and decode the first QR code in it
    pub fn decode_file(&self, path: &Path) -> Result<QrPayload> {
        let image = image::open(path).map_err(|e| {
            Error::Image(format!("Failed to open {}: {e}", path.display()))
        })?;
        self.decode(&image)
    }

    /// Decode a QR code from an image
    pub fn decode(&self, img: &DynamicImage) -> Result<QrPayload> {
        self.decode_gray(&img.to_luma8())
    }

    /// Decode a QR code from a grayscale image
    pub fn decode_gray(&self, img: &GrayImage) -> Result<QrPayload> {
        let mut prepared = rqrr::PreparedImage::prepare(img.clone());
        let grids = prepared.detect_grids();

        let grid = grids.first().ok_or(Error::NoQrCodeFound)?;

        match grid.decode() {
            Ok((meta, content)) => {
                tracing::debug!(
                    "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );

                Ok(QrPayload::from_bytes(content.into_bytes()))
            }
            Err(e) => Err(Error::QrDecode(format!("Decode failed: {:?}", e))),
        }
    }

    /// Decode every QR code found in an image
    pub fn decode_all(&self, img: &DynamicImage) -> Result<Vec<QrPayload>> {
        let mut prepared = rqrr::PreparedImage::prepare(img.to_luma8());
        let grids = prepared.detect_grids();

        if grids.is_empty() {
            return Err(Error::NoQrCodeFound);
        }

        let mut payloads = Vec::new();
        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => payloads.push(QrPayload::from_bytes(content.into_bytes())),
                Err(e) => tracing::warn!("Failed to decode one QR code: {:?}", e),
            }
        }

        if payloads.is_empty() {
            return Err(Error::QrDecode("No QR codes could be decoded".to_string()));
        }

        Ok(payloads)
    }
}
