//! Collision-free names for temporary clipboard files

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix shared by every temporary file the bridge creates
pub const TEMP_FILE_PREFIX: &str = "temp_qrcode_";

/// Extension of every temporary file the bridge creates
pub const TEMP_FILE_EXTENSION: &str = "png";

/// Source of unique temporary file names.
///
/// Injected into [`ClipboardBridge`](super::ClipboardBridge) so that naming
/// does not depend on ambient process state in tests.
pub trait TempNameSource: Send + Sync + std::fmt::Debug {
    /// Produce a file name (no directory) that has not been returned before.
    fn next_name(&self) -> String;
}

/// Names built from the process id and a nanosecond timestamp.
///
/// Timestamps are forced strictly increasing per generator, so two calls
/// never observe the same value even when the clock does not advance.
#[derive(Debug)]
pub struct ProcessClockNames {
    pid: u32,
    last_stamp: AtomicU64,
}

impl ProcessClockNames {
    /// Create a generator bound to the current process id
    pub fn new() -> Self {
        Self::with_pid(std::process::id())
    }

    /// Create a generator for an explicit process id
    pub fn with_pid(pid: u32) -> Self {
        Self {
            pid,
            last_stamp: AtomicU64::new(0),
        }
    }

    fn next_stamp(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let mut current = self.last_stamp.load(Ordering::Relaxed);

        loop {
            let next = now.max(current.saturating_add(1));
            match self.last_stamp.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }
}

impl Default for ProcessClockNames {
    fn default() -> Self {
        Self::new()
    }
}

impl TempNameSource for ProcessClockNames {
    fn next_name(&self) -> String {
        format!(
            "{TEMP_FILE_PREFIX}{}_{}.{TEMP_FILE_EXTENSION}",
            self.pid,
            self.next_stamp()
        )
    }
}

/// Whether `name` looks like a file produced by the bridge.
pub fn is_temp_name(name: &str) -> bool {
    name.starts_with(TEMP_FILE_PREFIX)
        && name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == TEMP_FILE_EXTENSION)
}
