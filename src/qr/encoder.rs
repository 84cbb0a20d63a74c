//! QR code encoder

use crate::error::{Error, Result};
use crate::qr::{QrOptions, QrPayload};
use image::{DynamicImage, Luma};
use qrcode::QrCode;

/// QR code encoder
#[derive(Debug, Clone, Default)]
pub struct QrEncoder {
    options: QrOptions,
}

impl QrEncoder {
    /// Create a new QR encoder with default settings (Medium ECC, 256px)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new QR encoder with explicit rendering options
    pub fn with_options(options: QrOptions) -> Self {
        Self { options }
    }

    /// Create a new QR encoder with a specific error correction level
    pub fn with_ecc_level(ecc_level: qrcode::EcLevel) -> Self {
        Self::with_options(QrOptions {
            ecc_level,
            ..QrOptions::default()
        })
    }

    /// Rendering options in use
    pub fn options(&self) -> &QrOptions {
        &self.options
    }

    /// Encode data into a QR code image
    pub fn encode(&self, payload: &QrPayload) -> Result<DynamicImage> {
        if payload.is_empty() {
            return Err(Error::QrEncode("Nothing to encode: input is empty".to_string()));
        }

        let code = QrCode::with_error_correction_level(&payload.data, self.options.ecc_level)
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))?;

        let image = code
            .render::<Luma<u8>>()
            .quiet_zone(self.options.quiet_zone)
            .min_dimensions(self.options.size, self.options.size)
            .build();

        tracing::debug!(
            version = ?code.version(),
            width = image.width(),
            bytes = payload.data.len(),
            "rendered QR code"
        );

        Ok(DynamicImage::ImageLuma8(image))
    }

    /// Encode a string into a QR code image
    pub fn encode_string(&self, data: &str) -> Result<DynamicImage> {
        let payload = QrPayload::from_string(data.to_string());
        self.encode(&payload)
    }

    /// Encode bytes into a QR code image
    pub fn encode_bytes(&self, data: &[u8]) -> Result<DynamicImage> {
        let payload = QrPayload::from_bytes(data.to_vec());
        self.encode(&payload)
    }
}
