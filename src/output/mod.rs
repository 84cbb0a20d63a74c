//! Saving generated codes and rendering command results

use crate::error::{Error, Result};
use crate::qr::{QrPayload, QrOptions, ec_level_label};
use hex::encode as hex_encode;
use image::DynamicImage;
use image::codecs::png::PngEncoder;
use serde_json::{Map, Value, json};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Combined structured and human-readable representation of a command result
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Write `image` to `path` as PNG, creating parent directories as needed.
///
/// Returns the number of bytes written.
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<u64> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory {}: {e}", parent.display()),
                ))
            })?;
        }
    }

    let file = File::create(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create {}: {e}", path.display()),
        ))
    })?;
    let mut writer = BufWriter::new(file);
    image.write_with_encoder(PngEncoder::new(&mut writer))?;
    writer.flush()?;

    let written = fs::metadata(path)?.len();
    tracing::info!(path = %path.display(), bytes = written, "saved QR code");
    Ok(written)
}

/// Outcome of the clipboard step of `generate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyStatus {
    /// Copy was not requested
    Skipped,
    /// Image is on the clipboard
    Copied,
    /// Copy failed with the given message
    Failed(String),
}

/// Summary of a `generate` run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Encoded payload
    pub payload: QrPayload,
    /// Options used to render the code
    pub options: QrOptions,
    /// Rendered image width in pixels
    pub width: u32,
    /// Rendered image height in pixels
    pub height: u32,
    /// Where the PNG was saved, with its size in bytes
    pub saved: Option<(PathBuf, u64)>,
    /// Clipboard step outcome
    pub copy: CopyStatus,
    /// Whether decoding the rendered image returned the same payload
    pub verified: Option<bool>,
}

impl GenerationReport {
    /// Whether every requested action succeeded
    pub fn is_success(&self) -> bool {
        !matches!(self.copy, CopyStatus::Failed(_)) && self.verified != Some(false)
    }
}

/// Render a generation report into both JSON and human-readable forms.
pub fn render_generation(report: &GenerationReport) -> Rendered {
    let mut root = Map::new();
    root.insert("payload".to_string(), payload_value(&report.payload));
    root.insert(
        "ecc".to_string(),
        Value::String(ec_level_label(report.options.ecc_level).to_string()),
    );
    root.insert("width".to_string(), Value::from(report.width));
    root.insert("height".to_string(), Value::from(report.height));
    root.insert(
        "saved".to_string(),
        match &report.saved {
            Some((path, bytes)) => json!({
                "path": path.display().to_string(),
                "bytes": bytes,
            }),
            None => Value::Null,
        },
    );
    root.insert(
        "clipboard".to_string(),
        match &report.copy {
            CopyStatus::Skipped => json!({ "status": "skipped" }),
            CopyStatus::Copied => json!({ "status": "copied" }),
            CopyStatus::Failed(message) => json!({ "status": "failed", "error": message }),
        },
    );
    root.insert(
        "verified".to_string(),
        report.verified.map(Value::Bool).unwrap_or(Value::Null),
    );

    let mut human = vec![format!(
        "QR code generated: {}x{} px, ECC {}",
        report.width,
        report.height,
        ec_level_label(report.options.ecc_level)
    )];
    human.push(format!("  Content: {}", payload_label(&report.payload)));
    if let Some((path, bytes)) = &report.saved {
        human.push(format!("  Saved to {} ({} bytes)", path.display(), bytes));
    }
    match &report.copy {
        CopyStatus::Skipped => {}
        CopyStatus::Copied => human.push("  Copied to clipboard".to_string()),
        CopyStatus::Failed(message) => human.push(format!("  Copy failed: {message}")),
    }
    match report.verified {
        Some(true) => human.push("  Verified: decoded payload matches".to_string()),
        Some(false) => human.push("  Verified: decoded payload DOES NOT match".to_string()),
        None => {}
    }

    Rendered {
        json: Value::Object(root),
        human,
    }
}

/// Render a decoded payload into both JSON and human-readable forms.
pub fn render_decoded(source: &Path, payload: &QrPayload) -> Rendered {
    let json = json!({
        "source": source.display().to_string(),
        "qr": payload_value(payload),
    });
    let human = match payload.as_str() {
        Some(text) => vec![format!("QR text: {text}")],
        None => vec![format!(
            "QR binary payload ({} bytes): {}",
            payload.as_bytes().len(),
            format_hex_snippet(payload.as_bytes())
        )],
    };
    Rendered { json, human }
}

fn payload_value(payload: &QrPayload) -> Value {
    json!({
        "text": payload.as_str(),
        "bytes_hex": hex_encode(payload.as_bytes()),
        "byte_length": payload.as_bytes().len(),
    })
}

fn payload_label(payload: &QrPayload) -> String {
    match payload.as_str() {
        Some(text) => format_text_snippet(text),
        None => format_hex_snippet(payload.as_bytes()),
    }
}

fn format_hex_snippet(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "empty".to_string();
    }

    let hex = hex_encode(bytes);
    const MAX: usize = 64;
    if hex.len() > MAX {
        format!("{}... ({} bytes)", &hex[..MAX], bytes.len())
    } else {
        format!("{} ({} bytes)", hex, bytes.len())
    }
}

fn format_text_snippet(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let snippet: String = text.chars().take(MAX).collect();
        let total = text.chars().count();
        format!("{}... ({} chars)", snippet, total)
    }
}
