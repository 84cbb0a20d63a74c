use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, Rgba, Rgba32FImage, RgbaImage};

use qrclip::clipboard::naming::{TempNameSource, is_temp_name};
use qrclip::clipboard::{ClipboardBridge, ClipboardError, ClipboardWriter, UnsupportedWriter};
use qrclip::{Error, QrEncoder};

/// Records every path handed to it together with the file contents at that moment.
#[derive(Debug, Default)]
struct RecordingWriter {
    calls: Mutex<Vec<(PathBuf, Vec<u8>)>>,
    fail_with: Option<(String, String)>,
}

impl RecordingWriter {
    fn failing(status: &str, output: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some((status.to_string(), output.to_string())),
        }
    }

    fn calls(&self) -> Vec<(PathBuf, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClipboardWriter for RecordingWriter {
    fn name(&self) -> &str {
        "recording"
    }

    async fn set_image(&self, path: &Path) -> Result<(), ClipboardError> {
        let bytes = fs::read(path).expect("temp file readable during set_image");
        self.calls.lock().unwrap().push((path.to_path_buf(), bytes));

        match &self.fail_with {
            Some((status, output)) => Err(ClipboardError::ExternalProcess {
                program: "powershell.exe".to_string(),
                status: status.clone(),
                output: output.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct SequentialNames(AtomicU64);

impl TempNameSource for SequentialNames {
    fn next_name(&self) -> String {
        format!("temp_qrcode_test_{}.png", self.0.fetch_add(1, Ordering::Relaxed))
    }
}

fn red_square() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255])))
}

fn leftover_temp_files(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| is_temp_name(name))
        .collect()
}

#[tokio::test]
async fn red_square_reaches_clipboard_and_temp_file_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let bridge = ClipboardBridge::new(writer.clone()).with_temp_dir(dir.path());

    let source = red_square();
    bridge.copy_image_to_clipboard(&source).await.unwrap();

    let calls = writer.calls();
    assert_eq!(calls.len(), 1);
    let (path, bytes) = &calls[0];
    assert_eq!(path.parent(), Some(dir.path()));
    assert!(is_temp_name(&path.file_name().unwrap().to_string_lossy()));

    let received = image::load_from_memory_with_format(bytes, image::ImageFormat::Png).unwrap();
    assert_eq!(received.to_rgba8(), source.to_rgba8());

    assert!(!path.exists());
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[tokio::test]
async fn helper_failure_carries_output_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let output = "Exception calling \"SetImage\": Requested Clipboard operation did not succeed.\r\n";
    let writer = Arc::new(RecordingWriter::failing("exit code 1", output));
    let bridge = ClipboardBridge::new(writer.clone()).with_temp_dir(dir.path());

    let err = bridge.copy_image_to_clipboard(&red_square()).await.unwrap_err();

    assert!(matches!(err, ClipboardError::ExternalProcess { .. }));
    assert_eq!(err.process_output(), Some(output));
    assert!(err.to_string().contains(output));
    assert_eq!(writer.calls().len(), 1);
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[tokio::test]
async fn unsupported_platform_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let names = Arc::new(SequentialNames::default());
    let bridge = ClipboardBridge::new(Arc::new(UnsupportedWriter::new("plan9")))
        .with_temp_dir(dir.path())
        .with_names(names.clone());

    let err = bridge.copy_image_to_clipboard(&red_square()).await.unwrap_err();

    match err {
        ClipboardError::UnsupportedPlatform { platform } => assert_eq!(platform, "plan9"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(names.0.load(Ordering::Relaxed), 0, "no temp name should be drawn");
}

#[tokio::test]
async fn empty_image_is_rejected_before_any_activity() {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let bridge = ClipboardBridge::new(writer.clone()).with_temp_dir(dir.path());

    let empty = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
    let err = bridge.copy_image_to_clipboard(&empty).await.unwrap_err();

    assert!(matches!(
        err,
        ClipboardError::InvalidImage {
            width: 0,
            height: 0
        }
    ));
    assert!(writer.calls().is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn encode_failure_removes_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let bridge = ClipboardBridge::new(writer.clone()).with_temp_dir(dir.path());

    // PNG has no 32-bit float sample format.
    let float_image = DynamicImage::ImageRgba32F(Rgba32FImage::new(4, 4));
    let err = bridge.copy_image_to_clipboard(&float_image).await.unwrap_err();

    assert!(matches!(err, ClipboardError::Encode(_)), "got {err:?}");
    assert!(writer.calls().is_empty());
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[tokio::test]
async fn name_collision_is_resource_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("temp_qrcode_test_0.png"), b"occupied").unwrap();

    let writer = Arc::new(RecordingWriter::default());
    let bridge = ClipboardBridge::new(writer.clone())
        .with_temp_dir(dir.path())
        .with_names(Arc::new(SequentialNames::default()));

    let err = bridge.copy_image_to_clipboard(&red_square()).await.unwrap_err();
    assert!(matches!(err, ClipboardError::ResourceUnavailable { .. }));
    assert!(writer.calls().is_empty());

    // The pre-existing file belongs to someone else and must survive.
    assert_eq!(
        fs::read(dir.path().join("temp_qrcode_test_0.png")).unwrap(),
        b"occupied"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_copies_use_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let bridge = Arc::new(ClipboardBridge::new(writer.clone()).with_temp_dir(dir.path()));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move { bridge.copy_image_to_clipboard(&red_square()).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let mut paths: Vec<PathBuf> = writer.calls().into_iter().map(|(path, _)| path).collect();
    assert_eq!(paths.len(), 16);
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 16, "temp file names collided");
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[tokio::test]
async fn generated_qr_code_round_trips_through_bridge() {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let bridge = ClipboardBridge::new(writer.clone()).with_temp_dir(dir.path());

    let image = QrEncoder::new().encode_string("https://example.com/qrclip").unwrap();
    bridge.copy_image_to_clipboard(&image).await.unwrap();

    let (_, bytes) = writer.calls().remove(0);
    let received = image::load_from_memory(&bytes).unwrap();
    assert_eq!(received.to_luma8(), image.to_luma8());
}

#[tokio::test]
async fn clipboard_errors_convert_into_crate_error() {
    let bridge = ClipboardBridge::new(Arc::new(UnsupportedWriter::new("haiku")));
    let err: Error = bridge
        .copy_image_to_clipboard(&red_square())
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, Error::Clipboard(ClipboardError::UnsupportedPlatform { .. })));
    assert_eq!(err.to_string(), "Clipboard image copy is not supported on haiku");
}
