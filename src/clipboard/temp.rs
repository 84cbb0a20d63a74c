//! Scoped temporary PNG file with guaranteed cleanup

use super::ClipboardError;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A temporary file that is closed and removed when dropped.
///
/// Cleanup failures are logged and never reported to the caller, and a file
/// that is already gone is not treated as a failure.
#[derive(Debug)]
pub(crate) struct TempPng {
    path: PathBuf,
    file: Option<File>,
}

impl TempPng {
    /// Create a new file `name` inside `dir`. Fails if the file already exists.
    pub(crate) fn create(dir: &Path, name: &str) -> Result<Self, ClipboardError> {
        let path = dir.join(name);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                ClipboardError::resource(
                    format!("failed to create temporary file {}", path.display()),
                    Some(e),
                )
            })?;

        tracing::trace!(path = %path.display(), "created temporary clipboard file");
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Encode `image` as PNG into the open file.
    pub(crate) fn write_image(&mut self, image: &DynamicImage) -> Result<(), ClipboardError> {
        let path = self.path.clone();
        let file = self.file.as_mut().ok_or_else(|| ClipboardError::Io {
            path: path.clone(),
            source: io::Error::other("temporary file already closed"),
        })?;

        let mut writer = BufWriter::new(file);
        PngEncoder::new(&mut writer)
            .write_image(
                image.as_bytes(),
                image.width(),
                image.height(),
                image.color().into(),
            )
            .map_err(ClipboardError::Encode)?;

        writer
            .flush()
            .map_err(|source| ClipboardError::Io { path, source })
    }

    /// Flush file contents to disk and release the handle.
    pub(crate) fn close(&mut self) -> Result<(), ClipboardError> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|source| ClipboardError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl Drop for TempPng {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(err) = file.sync_all() {
                tracing::warn!(
                    path = %self.path.display(),
                    "Failed to close temporary clipboard file: {err}"
                );
            }
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::trace!(path = %self.path.display(), "removed temporary clipboard file");
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Failed to remove temporary clipboard file: {err}"
                );
            }
        }
    }
}
