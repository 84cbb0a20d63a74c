//! Generate a QR code, save it to a file and try to copy it to the clipboard
//!
//! Usage: cargo run --example generate_qr

use qrclip::{ClipboardBridge, ClipboardError, ClipboardOptions, QrEncoder, QrPayload};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let encoder = QrEncoder::new();

    let payload = QrPayload::from_string("Hello from qrclip!".to_string());
    let qr_image = encoder.encode(&payload)?;

    let bytes = qrclip::output::save_png(&qr_image, "qr_output.png".as_ref())?;
    println!("✓ QR code generated and saved to qr_output.png ({bytes} bytes)");

    let bridge = ClipboardBridge::for_platform(&ClipboardOptions::default());
    match bridge.copy_image_to_clipboard(&qr_image).await {
        Ok(()) => println!("✓ QR code copied to clipboard"),
        Err(ClipboardError::UnsupportedPlatform { platform }) => {
            println!("  Clipboard copy is not available on {platform}");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
