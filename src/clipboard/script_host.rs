//! Clipboard writer that delegates to the Windows PowerShell scripting host

use super::{ClipboardError, ClipboardWriter};
use crate::config::ClipboardOptions;
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Scripting host invoked when no program is configured
pub const DEFAULT_PROGRAM: &str = "powershell.exe";

/// Arguments placed before the generated script
pub const DEFAULT_ARGS: [&str; 5] = [
    "-NoProfile",
    "-NonInteractive",
    "-ExecutionPolicy",
    "Bypass",
    "-Command",
];

/// Places a PNG file on the clipboard by running a short PowerShell script.
///
/// The script is passed as the final argument after `args`. The helper
/// signals failure through a non-zero exit code and an error message on
/// stderr; both are surfaced through [`ClipboardError::ExternalProcess`].
#[derive(Debug, Clone)]
pub struct ScriptHostWriter {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ScriptHostWriter {
    /// Writer using `powershell.exe` with no timeout
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: DEFAULT_ARGS.iter().map(|a| a.to_string()).collect(),
            timeout: None,
        }
    }

    /// Build a writer from user configuration
    pub fn from_options(options: &ClipboardOptions) -> Self {
        let mut writer = Self::new();
        if let Some(program) = &options.program {
            writer.program = program.clone();
        }
        if let Some(args) = &options.args {
            writer.args = args.clone();
        }
        writer.timeout = options
            .timeout_secs
            .map(Duration::from_secs)
            .filter(|timeout| !timeout.is_zero());
        writer
    }

    /// Override the program that runs the script
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Override the arguments placed before the script
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kill the helper and fail if it runs longer than `timeout`.
    ///
    /// A zero duration disables the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Program invoked by this writer
    pub fn program(&self) -> &str {
        &self.program
    }

    fn process_error(&self, status: impl Into<String>, output: String) -> ClipboardError {
        ClipboardError::ExternalProcess {
            program: self.program.clone(),
            status: status.into(),
            output,
        }
    }
}

impl Default for ScriptHostWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipboardWriter for ScriptHostWriter {
    fn name(&self) -> &str {
        "script-host"
    }

    async fn set_image(&self, path: &Path) -> Result<(), ClipboardError> {
        let script = set_image_script(path);
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(program = %self.program, path = %path.display(), "invoking clipboard helper");

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(self.process_error(
                        format!("timed out after {}ms", limit.as_millis()),
                        String::new(),
                    ));
                }
            },
            None => command.output().await,
        };

        let output = result
            .map_err(|e| self.process_error("failed to launch", e.to_string()))?;
        let combined = combined_output(&output);

        if output.status.success() {
            tracing::debug!(program = %self.program, "clipboard helper finished");
            Ok(())
        } else {
            let status = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            };
            Err(self.process_error(status, combined))
        }
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Render `path` for embedding in a single-quoted PowerShell string.
pub fn script_path_literal(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace('\'', "''")
}

/// PowerShell script that loads the PNG at `path` and sets it as clipboard image.
pub fn set_image_script(path: &Path) -> String {
    let literal = script_path_literal(path);
    format!(
        "$ErrorActionPreference = 'Stop'; \
         try {{ \
         Add-Type -AssemblyName System.Windows.Forms; \
         Add-Type -AssemblyName System.Drawing; \
         $image = [System.Drawing.Image]::FromFile('{literal}'); \
         try {{ [System.Windows.Forms.Clipboard]::SetImage($image) }} \
         finally {{ $image.Dispose() }} \
         }} catch {{ \
         [Console]::Error.WriteLine($_.Exception.Message); \
         exit 1 \
         }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn path_separators_are_normalized() {
        let path = PathBuf::from(r"C:\Users\me\AppData\Local\Temp\temp_qrcode_1_2.png");
        assert_eq!(
            script_path_literal(&path),
            "C:/Users/me/AppData/Local/Temp/temp_qrcode_1_2.png"
        );
    }

    #[test]
    fn single_quotes_are_escaped() {
        let path = PathBuf::from(r"C:\Users\o'brien\temp_qrcode_1_2.png");
        assert_eq!(
            script_path_literal(&path),
            "C:/Users/o''brien/temp_qrcode_1_2.png"
        );
    }

    #[test]
    fn script_loads_sets_and_disposes() {
        let script = set_image_script(Path::new("/tmp/temp_qrcode_1_2.png"));
        assert!(script.contains("[System.Drawing.Image]::FromFile('/tmp/temp_qrcode_1_2.png')"));
        assert!(script.contains("[System.Windows.Forms.Clipboard]::SetImage($image)"));
        assert!(script.contains("$image.Dispose()"));
        assert!(script.contains("exit 1"));
    }

    #[test]
    fn options_override_defaults() {
        let options = ClipboardOptions {
            program: Some("pwsh".to_string()),
            args: Some(vec!["-Command".to_string()]),
            timeout_secs: Some(7),
            temp_dir: None,
        };
        let writer = ScriptHostWriter::from_options(&options);
        assert_eq!(writer.program(), "pwsh");
        assert_eq!(writer.args, vec!["-Command".to_string()]);
        assert_eq!(writer.timeout, Some(Duration::from_secs(7)));

        let defaults = ScriptHostWriter::from_options(&ClipboardOptions::default());
        assert_eq!(defaults.program(), DEFAULT_PROGRAM);
        assert_eq!(defaults.args.len(), DEFAULT_ARGS.len());
        assert!(defaults.timeout.is_none());
    }

    #[test]
    fn zero_timeout_means_wait_indefinitely() {
        let options = ClipboardOptions {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(ScriptHostWriter::from_options(&options).timeout.is_none());
        assert!(
            ScriptHostWriter::new()
                .with_timeout(Duration::ZERO)
                .timeout
                .is_none()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_timeout_from_config_lets_helper_finish() {
        let options = ClipboardOptions {
            program: Some("sh".to_string()),
            args: Some(vec!["-c".to_string(), "sleep 0.2; exit 0".to_string()]),
            timeout_secs: Some(0),
            temp_dir: None,
        };
        ScriptHostWriter::from_options(&options)
            .set_image(Path::new("unused.png"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_program_is_launch_failure() {
        let writer = ScriptHostWriter::new().with_program("qrclip-no-such-helper-binary");
        let err = writer
            .set_image(Path::new("unused.png"))
            .await
            .unwrap_err();
        match err {
            ClipboardError::ExternalProcess { status, program, .. } => {
                assert_eq!(status, "failed to launch");
                assert_eq!(program, "qrclip-no-such-helper-binary");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_carries_output_verbatim() {
        let writer = ScriptHostWriter::new()
            .with_program("sh")
            .with_args(["-c", "printf 'loading image'; printf 'clipboard busy' >&2; exit 3"]);
        let err = writer
            .set_image(Path::new("unused.png"))
            .await
            .unwrap_err();
        match &err {
            ClipboardError::ExternalProcess { status, output, .. } => {
                assert_eq!(status, "exit code 3");
                assert_eq!(output, "loading imageclipboard busy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("clipboard busy"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let writer = ScriptHostWriter::new().with_program("sh").with_args(["-c", "exit 0"]);
        writer.set_image(Path::new("unused.png")).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_helper() {
        let writer = ScriptHostWriter::new()
            .with_program("sh")
            .with_args(["-c", "sleep 5"])
            .with_timeout(Duration::from_millis(100));
        let err = writer
            .set_image(Path::new("unused.png"))
            .await
            .unwrap_err();
        match err {
            ClipboardError::ExternalProcess { status, .. } => {
                assert!(status.starts_with("timed out"), "status: {status}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
