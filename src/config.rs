//! qrclip runtime configuration handling

use crate::error::{Error, Result};
use crate::qr::{QrOptions, parse_ec_level};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrclipConfig {
    /// QR rendering defaults
    pub qr: QrSettings,
    /// Clipboard helper configuration
    pub clipboard: ClipboardOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl QrclipConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qrclip.toml / qrclip.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qrclip.toml", "qrclip.yaml", "qrclip.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qrclip");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.qr.apply_env_overrides();
        self.clipboard.apply_env_overrides();
        self.logging.apply_env_overrides();
    }

    /// Produce fully resolved QR rendering options.
    pub fn qr_options(&self) -> Result<QrOptions> {
        self.qr.to_qr_options()
    }
}

/// User-facing QR defaults merged on top of `QrOptions::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrSettings {
    /// Error correction level (`l`, `m`, `q` or `h`)
    pub ecc: Option<String>,
    /// Minimum rendered width/height in pixels
    pub size: Option<u32>,
    /// Whether to draw the quiet zone around the symbol
    pub quiet_zone: Option<bool>,
}

impl QrSettings {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(ecc) = env::var("QRCLIP_QR_ECC") {
            self.ecc = Some(ecc);
        }
        if let Ok(size) = env::var("QRCLIP_QR_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.size = Some(parsed);
            }
        }
    }

    /// Merge overrides onto the default QR options.
    pub fn to_qr_options(&self) -> Result<QrOptions> {
        let mut options = QrOptions::default();

        if let Some(ecc) = &self.ecc {
            options.ecc_level = parse_ec_level(ecc).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown error correction level '{}'. Use l, m, q, or h",
                    ecc
                ))
            })?;
        }

        if let Some(size) = self.size {
            if size == 0 {
                return Err(Error::Config("QR size must be greater than zero".to_string()));
            }
            options.size = size;
        }

        if let Some(quiet_zone) = self.quiet_zone {
            options.quiet_zone = quiet_zone;
        }

        Ok(options)
    }
}

/// Clipboard helper configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardOptions {
    /// Scripting host program (defaults to `powershell.exe`)
    pub program: Option<String>,
    /// Arguments placed before the generated script
    pub args: Option<Vec<String>>,
    /// Kill the helper after this many seconds; unset or `0` waits indefinitely
    pub timeout_secs: Option<u64>,
    /// Directory for temporary PNG files; defaults to the OS temp directory
    pub temp_dir: Option<PathBuf>,
}

impl ClipboardOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(program) = env::var("QRCLIP_CLIPBOARD_PROGRAM") {
            if !program.trim().is_empty() {
                self.program = Some(program);
            }
        }
        if let Ok(timeout) = env::var("QRCLIP_CLIPBOARD_TIMEOUT_SECS") {
            self.apply_timeout_override(&timeout);
        }
        if let Ok(dir) = env::var("QRCLIP_TEMP_DIR") {
            if dir.trim().is_empty() {
                self.temp_dir = None;
            } else {
                self.temp_dir = Some(PathBuf::from(dir));
            }
        }
    }

    /// `0` clears the timeout; values that are not a number are ignored.
    fn apply_timeout_override(&mut self, value: &str) {
        match value.trim().parse::<u64>() {
            Ok(0) => self.timeout_secs = None,
            Ok(secs) => self.timeout_secs = Some(secs),
            Err(_) => tracing::warn!(
                value,
                "Ignoring QRCLIP_CLIPBOARD_TIMEOUT_SECS, expected whole seconds"
            ),
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRCLIP_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in terminal logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("QRCLIP_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("QRCLIP_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("QRCLIP_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("QRCLIP_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::parse(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
