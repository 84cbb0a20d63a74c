//! qrclip command-line entrypoint

use clap::{Parser, Subcommand};
use qrclip::output::{CopyStatus, GenerationReport, Rendered, render_generation};
use qrclip::qr::parse_ec_level;
use qrclip::{ClipboardBridge, Error, QrEncoder, QrPayload, QrclipConfig, Result, clipboard, logging};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "qrclip",
    version,
    about = "Turn text into a QR code, save it as PNG or copy it to the clipboard"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qrclip.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render TEXT (or stdin when omitted) as a QR code
    Generate {
        /// Content to encode
        text: Option<String>,

        /// Error correction level: l, m, q or h
        #[arg(long, value_name = "LEVEL")]
        ecc: Option<String>,

        /// Minimum image width/height in pixels
        #[arg(long, value_name = "PX")]
        size: Option<u32>,

        /// Save the QR code as PNG to this path
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Copy the QR code image to the system clipboard
        #[arg(short, long)]
        copy: bool,

        /// Decode the rendered image and check it matches the input
        #[arg(long)]
        verify: bool,

        /// Output results as formatted JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Print the contents of the QR code in an image file
    #[cfg(feature = "decode")]
    Decode {
        /// Image file to scan
        path: PathBuf,

        /// Output results as formatted JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Report whether clipboard image copy is available on this platform
    Platform,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = QrclipConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    match cli.command {
        Command::Generate {
            text,
            ecc,
            size,
            output,
            copy,
            verify,
            json,
        } => {
            let request = GenerateRequest {
                text,
                ecc,
                size,
                output,
                copy,
                verify,
                json,
            };
            handle_generate(&config, request).await
        }
        #[cfg(feature = "decode")]
        Command::Decode { path, json } => handle_decode(&path, json),
        Command::Platform => {
            if clipboard::is_supported() {
                println!("Clipboard image copy is supported on {}", std::env::consts::OS);
                Ok(ExitCode::SUCCESS)
            } else {
                println!(
                    "Clipboard image copy is not supported on {}",
                    std::env::consts::OS
                );
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

struct GenerateRequest {
    text: Option<String>,
    ecc: Option<String>,
    size: Option<u32>,
    output: Option<PathBuf>,
    copy: bool,
    verify: bool,
    json: bool,
}

async fn handle_generate(config: &QrclipConfig, request: GenerateRequest) -> Result<ExitCode> {
    let mut options = config.qr_options()?;
    if let Some(ref ecc) = request.ecc {
        options.ecc_level = parse_ec_level(ecc).ok_or_else(|| {
            Error::Config(format!("Unknown error correction level '{ecc}'. Use l, m, q, or h"))
        })?;
    }
    if let Some(size) = request.size {
        if size == 0 {
            return Err(Error::Config("--size must be greater than zero".to_string()));
        }
        options.size = size;
    }

    let text = match request.text {
        Some(text) => text,
        None => read_stdin()?,
    };
    let payload = QrPayload::from_string(text);

    let image = QrEncoder::with_options(options).encode(&payload)?;
    info!(width = image.width(), height = image.height(), "QR code rendered");

    let saved = match request.output {
        Some(path) => {
            let bytes = qrclip::output::save_png(&image, &path)?;
            Some((path, bytes))
        }
        None => None,
    };

    let copy = if request.copy {
        let bridge = ClipboardBridge::for_platform(&config.clipboard);
        match bridge.copy_image_to_clipboard(&image).await {
            Ok(()) => CopyStatus::Copied,
            Err(err) => CopyStatus::Failed(err.to_string()),
        }
    } else {
        CopyStatus::Skipped
    };

    let verified = if request.verify {
        Some(verify_image(&image, &payload)?)
    } else {
        None
    };

    let report = GenerationReport {
        payload,
        options,
        width: image.width(),
        height: image.height(),
        saved,
        copy,
        verified,
    };

    emit(&render_generation(&report), request.json)?;

    if report.saved.is_none() && matches!(report.copy, CopyStatus::Skipped) && !request.json {
        eprintln!("Hint: pass --output PATH to save the image or --copy to copy it");
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(feature = "decode")]
fn verify_image(image: &image::DynamicImage, payload: &QrPayload) -> Result<bool> {
    match qrclip::QrDecoder::new().decode(image) {
        Ok(decoded) => Ok(decoded.as_bytes() == payload.as_bytes()),
        Err(err) => {
            tracing::warn!("Verification decode failed: {err}");
            Ok(false)
        }
    }
}

#[cfg(not(feature = "decode"))]
fn verify_image(_image: &image::DynamicImage, _payload: &QrPayload) -> Result<bool> {
    Err(Error::Config(
        "--verify requires qrclip to be built with the `decode` feature".to_string(),
    ))
}

#[cfg(feature = "decode")]
fn handle_decode(path: &std::path::Path, json: bool) -> Result<ExitCode> {
    let payload = qrclip::QrDecoder::new().decode_file(path)?;
    emit(&qrclip::output::render_decoded(path, &payload), json)?;
    Ok(ExitCode::SUCCESS)
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Enter the QR code content, then press Ctrl-D:");
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text.trim_end_matches(['\r', '\n']).to_string())
}

fn emit(rendered: &Rendered, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }
    Ok(())
}
