//! Failures surfaced by the clipboard image bridge

use std::path::PathBuf;
use thiserror::Error;

/// Error returned when an image could not be placed on the system clipboard.
///
/// Every variant is terminal for the call that produced it; nothing is
/// retried internally.
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// No clipboard image writer exists for the current platform
    #[error("Clipboard image copy is not supported on {platform}")]
    UnsupportedPlatform {
        /// Platform name as reported by `std::env::consts::OS`
        platform: String,
    },

    /// The image has no pixels to copy
    #[error("Cannot copy an empty image ({width}x{height})")]
    InvalidImage {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },

    /// Temporary directory or temporary file could not be obtained
    #[error("Temporary resource unavailable: {context}")]
    ResourceUnavailable {
        /// What was being acquired
        context: String,
        /// Underlying I/O failure, if any
        #[source]
        source: Option<std::io::Error>,
    },

    /// The image could not be serialized to PNG
    #[error("Failed to encode image as PNG: {0}")]
    Encode(#[source] image::ImageError),

    /// Flushing or closing the temporary file failed
    #[error("Failed to flush temporary file {}: {source}", path.display())]
    Io {
        /// Temporary file path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The clipboard helper process failed to launch, exited non-zero or timed out
    #[error("Clipboard helper `{program}` failed ({status}): {output}")]
    ExternalProcess {
        /// Program that was invoked
        program: String,
        /// Exit status, launch failure or timeout description
        status: String,
        /// Captured combined stdout and stderr
        output: String,
    },
}

impl ClipboardError {
    pub(crate) fn resource(context: impl Into<String>, source: Option<std::io::Error>) -> Self {
        Self::ResourceUnavailable {
            context: context.into(),
            source,
        }
    }

    /// Captured helper output for `ExternalProcess` failures.
    pub fn process_output(&self) -> Option<&str> {
        match self {
            Self::ExternalProcess { output, .. } => Some(output),
            _ => None,
        }
    }
}
