use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use super::{JournalError, JournalResult};

pub const DURABLE_QUEUE_CAPACITY: usize = 1024;
const WRITER_THREAD_NAME: &str = "session-log-writer";

/// Single consumer for the durable sink; lines reach the file in enqueue order.
pub(super) struct DurableWriter {
    path: PathBuf,
    sender: Option<SyncSender<String>>,
    handle: Option<JoinHandle<()>>,
}

impl DurableWriter {
    pub(super) fn open(path: &Path) -> JournalResult<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.exists()) {
            fs::create_dir_all(parent).map_err(|source| JournalError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| JournalError::OpenFile {
                path: path.to_path_buf(),
                source,
            })?;

        let (sender, receiver) = mpsc::sync_channel::<String>(DURABLE_QUEUE_CAPACITY);
        let path_for_writer = path.to_path_buf();
        let handle = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || drain_lines(file, receiver, &path_for_writer))
            .map_err(|source| JournalError::SpawnWriter { source })?;

        Ok(Self {
            path: path.to_path_buf(),
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn enqueue(&self, line: String) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };

        match sender.try_send(line) {
            Ok(()) => {}
            Err(TrySendError::Full(line)) => {
                tracing::warn!(
                    capacity = DURABLE_QUEUE_CAPACITY,
                    "session log queue full; waiting for writer"
                );
                if sender.send(line).is_err() {
                    tracing::warn!("session log writer stopped; line not persisted");
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!("session log writer stopped; line not persisted");
            }
        }
    }

    pub(super) fn shutdown(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(path = %self.path.display(), "session log writer panicked");
            }
        }
    }
}

impl Drop for DurableWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn drain_lines(mut file: File, receiver: Receiver<String>, path: &Path) {
    for line in receiver {
        if let Err(err) = writeln!(file, "{line}") {
            tracing::warn!(?err, path = %path.display(), "failed to append session log line");
        }
    }
    if let Err(err) = file.flush() {
        tracing::warn!(?err, path = %path.display(), "failed to flush session log");
    }
}
