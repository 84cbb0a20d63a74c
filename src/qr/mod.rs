//! QR code encoding and decoding
//!
//! Encoding turns text or bytes into a grayscale raster image ready to be
//! saved or copied. Decoding (feature `decode`) reads the payload back out
//! of an image and is used to verify generated codes.

#[cfg(feature = "decode")]
mod decoder;
mod encoder;

#[cfg(feature = "decode")]
pub use decoder::QrDecoder;
pub use encoder::QrEncoder;

use qrcode::EcLevel;
use serde::{Deserialize, Serialize};

/// A QR code payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    /// The raw data
    pub data: Vec<u8>,
    /// String representation if valid UTF-8
    pub text: Option<String>,
}

impl QrPayload {
    /// Create a new QR payload from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let text = String::from_utf8(data.clone()).ok();
        Self { data, text }
    }

    /// Create a new QR payload from a string
    pub fn from_string(s: String) -> Self {
        Self {
            data: s.as_bytes().to_vec(),
            text: Some(s),
        }
    }

    /// Get the payload as a string, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Whether the payload carries no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Rendering options for generated QR codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    /// Error correction level
    pub ecc_level: EcLevel,
    /// Minimum width and height of the rendered image in pixels
    pub size: u32,
    /// Draw the white quiet zone around the symbol
    pub quiet_zone: bool,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            ecc_level: EcLevel::M,
            size: 256,
            quiet_zone: true,
        }
    }
}

/// Parse an error correction level from `l`, `m`, `q` or `h` (case-insensitive).
pub fn parse_ec_level(value: &str) -> Option<EcLevel> {
    match value.trim().to_ascii_lowercase().as_str() {
        "l" | "low" => Some(EcLevel::L),
        "m" | "medium" => Some(EcLevel::M),
        "q" | "quartile" => Some(EcLevel::Q),
        "h" | "high" => Some(EcLevel::H),
        _ => None,
    }
}

/// Single-letter label for an error correction level.
pub fn ec_level_label(level: EcLevel) -> &'static str {
    match level {
        EcLevel::L => "L",
        EcLevel::M => "M",
        EcLevel::Q => "Q",
        EcLevel::H => "H",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_payload_from_string() {
        let payload = QrPayload::from_string("hello world".to_string());
        assert_eq!(payload.as_str(), Some("hello world"));
        assert_eq!(payload.as_bytes(), b"hello world");
        assert!(!payload.is_empty());
    }

    #[test]
    fn test_qr_payload_from_bytes() {
        let payload = QrPayload::from_bytes(vec![0xFF, 0xFE]);
        assert!(payload.as_str().is_none());
        assert_eq!(payload.as_bytes(), &[0xFF, 0xFE]);
    }

    #[test]
    fn ec_level_parsing() {
        assert_eq!(parse_ec_level("H"), Some(EcLevel::H));
        assert_eq!(parse_ec_level(" medium "), Some(EcLevel::M));
        assert_eq!(parse_ec_level("z"), None);
        assert_eq!(ec_level_label(EcLevel::Q), "Q");
    }
}
