//! qrclip - turn text into QR code images and hand them to the clipboard
//!
//! This library renders QR codes from text or bytes, saves them as PNG files,
//! and places them on the system clipboard as image objects.
//!
//! # Features
//!
//! - **QR Processing**: encoding via `qrcode`, optional decoding via `rqrr`
//! - **Clipboard Bridge**: temp-file based hand-off to a platform scripting
//!   host with guaranteed cleanup
//! - **Async-first**: built on Tokio for non-blocking helper processes
//!
//! # Example
//!
//! ```no_run
//! use qrclip::{ClipboardBridge, ClipboardOptions, QrEncoder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let image = QrEncoder::new().encode_string("https://example.com")?;
//!
//!     let bridge = ClipboardBridge::for_platform(&ClipboardOptions::default());
//!     bridge.copy_image_to_clipboard(&image).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod clipboard;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod qr;

// Re-exports for convenience
pub use error::{Error, Result};

pub use clipboard::{ClipboardBridge, ClipboardError, ClipboardWriter, copy_image_to_clipboard};
pub use config::{ClipboardOptions, LogRotation, LoggingOptions, QrSettings, QrclipConfig};
#[cfg(feature = "decode")]
#[cfg_attr(docsrs, doc(cfg(feature = "decode")))]
pub use qr::QrDecoder;
pub use qr::{QrEncoder, QrOptions, QrPayload};
