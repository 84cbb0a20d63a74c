//! Clipboard image bridge
//!
//! Places a raster image on the system clipboard by writing it to a uniquely
//! named temporary PNG and handing that path to a platform [`ClipboardWriter`].
//! The temporary file is closed and deleted on every exit path, and cleanup
//! failures are logged rather than reported.
//!
//! Only Windows has a writer ([`ScriptHostWriter`], backed by PowerShell).
//! Every other platform gets [`UnsupportedWriter`], which fails before any
//! file or process activity takes place.

mod error;
pub mod naming;
pub mod script_host;
mod temp;

pub use error::ClipboardError;
pub use naming::{ProcessClockNames, TempNameSource};
pub use script_host::ScriptHostWriter;

use crate::config::ClipboardOptions;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use temp::TempPng;

/// A platform mechanism that loads a PNG file by path into the clipboard.
#[async_trait]
pub trait ClipboardWriter: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Fail early when this writer cannot work on the current platform.
    fn ensure_supported(&self) -> Result<(), ClipboardError> {
        Ok(())
    }

    /// Place the PNG at `path` on the clipboard. The file exists for the
    /// duration of the call and is removed afterwards by the caller.
    async fn set_image(&self, path: &Path) -> Result<(), ClipboardError>;
}

/// Writer for platforms without clipboard image support
#[derive(Debug, Clone)]
pub struct UnsupportedWriter {
    platform: String,
}

impl UnsupportedWriter {
    /// Writer reporting `platform` in its errors
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }

    /// Writer for the platform this binary was built for
    pub fn current() -> Self {
        Self::new(std::env::consts::OS)
    }

    fn error(&self) -> ClipboardError {
        ClipboardError::UnsupportedPlatform {
            platform: self.platform.clone(),
        }
    }
}

#[async_trait]
impl ClipboardWriter for UnsupportedWriter {
    fn name(&self) -> &str {
        "unsupported"
    }

    fn ensure_supported(&self) -> Result<(), ClipboardError> {
        Err(self.error())
    }

    async fn set_image(&self, _path: &Path) -> Result<(), ClipboardError> {
        Err(self.error())
    }
}

/// Select the clipboard writer for the platform this binary was built for.
pub fn platform_writer(options: &ClipboardOptions) -> Arc<dyn ClipboardWriter> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(ScriptHostWriter::from_options(options))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = options;
        Arc::new(UnsupportedWriter::current())
    }
}

/// Whether the current platform can place images on the clipboard.
pub fn is_supported() -> bool {
    platform_writer(&ClipboardOptions::default())
        .ensure_supported()
        .is_ok()
}

/// Moves raster images onto the clipboard through a temporary PNG file.
#[derive(Debug, Clone)]
pub struct ClipboardBridge {
    writer: Arc<dyn ClipboardWriter>,
    names: Arc<dyn TempNameSource>,
    temp_dir: Option<PathBuf>,
}

impl ClipboardBridge {
    /// Bridge using `writer`, process/clock based names and the OS temp directory
    pub fn new(writer: Arc<dyn ClipboardWriter>) -> Self {
        Self {
            writer,
            names: Arc::new(ProcessClockNames::new()),
            temp_dir: None,
        }
    }

    /// Bridge using the platform writer and the configured temp directory
    pub fn for_platform(options: &ClipboardOptions) -> Self {
        let mut bridge = Self::new(platform_writer(options));
        bridge.temp_dir = options.temp_dir.clone();
        bridge
    }

    /// Use `names` to generate temporary file names
    pub fn with_names(mut self, names: Arc<dyn TempNameSource>) -> Self {
        self.names = names;
        self
    }

    /// Place temporary files in `dir` instead of the OS temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Copy `image` to the system clipboard.
    ///
    /// Empty images and unsupported platforms are rejected before any file
    /// is created. Once the temporary file exists it is removed regardless
    /// of how the call ends.
    pub async fn copy_image_to_clipboard(&self, image: &DynamicImage) -> Result<(), ClipboardError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ClipboardError::InvalidImage {
                width: image.width(),
                height: image.height(),
            });
        }
        self.writer.ensure_supported()?;

        let dir = self.resolve_temp_dir()?;
        let name = self.names.next_name();
        let temp = prepare_temp_png(dir, name, image.clone()).await?;

        tracing::debug!(
            writer = self.writer.name(),
            path = %temp.path().display(),
            width = image.width(),
            height = image.height(),
            "copying image to clipboard"
        );

        let result = self.writer.set_image(temp.path()).await;
        drop(temp);

        match &result {
            Ok(()) => tracing::info!(writer = self.writer.name(), "image copied to clipboard"),
            Err(err) => tracing::warn!(writer = self.writer.name(), "clipboard copy failed: {err}"),
        }
        result
    }

    fn resolve_temp_dir(&self) -> Result<PathBuf, ClipboardError> {
        let dir = self.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
        if dir.as_os_str().is_empty() {
            return Err(ClipboardError::resource("temporary directory is empty", None));
        }
        if !dir.is_dir() {
            return Err(ClipboardError::resource(
                format!("temporary directory {} does not exist", dir.display()),
                None,
            ));
        }
        Ok(dir)
    }
}

/// Create, encode and close the temporary PNG off the async runtime.
///
/// A failed step drops the guard inside the blocking task, which removes
/// the partial file there.
async fn prepare_temp_png(
    dir: PathBuf,
    name: String,
    image: DynamicImage,
) -> Result<TempPng, ClipboardError> {
    tokio::task::spawn_blocking(move || -> Result<TempPng, ClipboardError> {
        let mut temp = TempPng::create(&dir, &name)?;
        temp.write_image(&image)?;
        temp.close()?;
        Ok(temp)
    })
    .await
    .map_err(|e| ClipboardError::resource(format!("temporary file task failed: {e}"), None))?
}

/// Copy `image` to the clipboard with the platform writer and default options.
pub async fn copy_image_to_clipboard(image: &DynamicImage) -> Result<(), ClipboardError> {
    ClipboardBridge::for_platform(&ClipboardOptions::default())
        .copy_image_to_clipboard(image)
        .await
}
