//! Session journal: every launcher decision is recorded here.
//!
//! Each entry goes to two sinks. The display sink is an in-memory, ordered
//! list that a front-end renders (and scrolls to the newest entry). The
//! durable sink appends the same line to a plain-text file through a single
//! background writer, so the file keeps the exact order of `record` calls
//! without the caller ever touching the disk.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

mod writer;

use self::writer::DurableWriter;
pub use self::writer::DURABLE_QUEUE_CAPACITY;

pub const LOG_FILE_NAME: &str = "orb_slam_log.txt";

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to start log writer thread: {source}")]
    SpawnWriter {
        #[source]
        source: io::Error,
    },
}

pub type JournalResult<T> = std::result::Result<T, JournalError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    timestamp_millis: i64,
    message: String,
}

impl LogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self::at(now_millis(), message)
    }

    pub fn at(timestamp_millis: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp_millis,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Rendered form shared by both sinks, without the trailing newline.
    pub fn line(&self) -> String {
        format!("[{}] {}", self.timestamp_millis, self.message)
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp_millis, self.message)
    }
}

type DisplayListener = Box<dyn Fn(&LogEntry)>;

#[derive(Default)]
struct DisplaySink {
    entries: Vec<LogEntry>,
    listener: Option<DisplayListener>,
}

/// Append-only, dual-sink recorder.
///
/// Owned by the UI loop thread. The durable writer is the only part that
/// runs elsewhere.
pub struct Logger {
    display: RefCell<DisplaySink>,
    durable: Option<DurableWriter>,
}

impl Logger {
    pub fn display_only() -> Self {
        Self {
            display: RefCell::new(DisplaySink::default()),
            durable: None,
        }
    }

    /// Opens (creating if needed) the durable file at `path`.
    ///
    /// A file that cannot be created is reported on the display sink only and
    /// the logger keeps working without persistence.
    pub fn open(path: &Path) -> Self {
        let mut logger = Self::display_only();
        match DurableWriter::open(path) {
            Ok(writer) => {
                logger.durable = Some(writer);
                logger.record(format!("[LOG] Log file initialized: {}", path.display()));
            }
            Err(err) => {
                tracing::warn!(?err, path = %path.display(), "durable session log unavailable");
                logger.push_display(LogEntry::new(format!(
                    "[LOG ERROR] Failed to create log file: {err}"
                )));
            }
        }
        logger
    }

    pub fn record(&self, message: impl Into<String>) {
        let entry = LogEntry::new(message);
        tracing::debug!(timestamp_millis = entry.timestamp_millis, "{}", entry.message);
        if let Some(durable) = &self.durable {
            durable.enqueue(entry.line());
        }
        self.push_display(entry);
    }

    /// Registers the display listener, called with every new entry after it
    /// has been appended. The listener must not record into this logger.
    pub fn set_display_listener(&self, listener: impl Fn(&LogEntry) + 'static) {
        self.display.borrow_mut().listener = Some(Box::new(listener));
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.display.borrow().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.display.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn durable_path(&self) -> Option<&Path> {
        self.durable.as_ref().map(DurableWriter::path)
    }

    pub fn is_durable(&self) -> bool {
        self.durable.is_some()
    }

    /// Stops the writer after every queued line has reached the file. Later
    /// entries only reach the display sink.
    pub fn close(&mut self) {
        if let Some(mut durable) = self.durable.take() {
            durable.shutdown();
        }
    }

    fn push_display(&self, entry: LogEntry) {
        self.display.borrow_mut().entries.push(entry);
        let sink = self.display.borrow();
        if let (Some(listener), Some(newest)) = (sink.listener.as_ref(), sink.entries.last()) {
            listener(newest);
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("entries", &self.len())
            .field("durable_path", &self.durable_path())
            .finish()
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn scratch_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "slam-launcher-{label}-{}-{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
