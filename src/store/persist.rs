//! Serialized persistence of state snapshots.
//!
//! All writes for a store go through one [`SaveQueue`]: a worker thread that
//! drains a FIFO channel and performs one write at a time. A write starts
//! only after the previous one has finished, whether it succeeded or failed,
//! so two saves issued back to back can never interleave on disk.
//!
//! Each write is atomic (temporary file in the target directory, then
//! rename) and holds an exclusive advisory lock on a sidecar `.lock` file for
//! its duration, so other tools reading the snapshot never observe a partial
//! document.

use crate::error::AuditError;
use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{Level, debug, span, warn};

/// One queued write
struct SaveJob {
    /// Monotonic sequence number, for logging
    seq: u64,
    /// Serialized snapshot
    bytes: Vec<u8>,
    /// Where the outcome is reported
    done: Sender<Result<(), AuditError>>,
}

/// Handle to a queued write
#[must_use = "a save may fail; call `wait` to observe the outcome"]
pub struct PendingSave {
    /// Sequence number of the write
    seq: u64,
    /// Outcome channel
    outcome: Receiver<Result<(), AuditError>>,
}

impl PendingSave {
    /// Sequence number assigned when the write was queued
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Block until the write has been attempted
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Persistence` if the write failed or the queue
    /// shut down before reaching it.
    pub fn wait(self) -> Result<(), AuditError> {
        self.outcome.recv().unwrap_or_else(|_| {
            Err(AuditError::Persistence(
                "save queue stopped before the write ran".to_string(),
            ))
        })
    }
}

/// FIFO writer for a single snapshot file
pub struct SaveQueue {
    /// Destination of every write
    path: PathBuf,
    /// Job channel; `None` once shut down
    sender: Option<Sender<SaveJob>>,
    /// Writer thread
    worker: Option<JoinHandle<()>>,
    /// Next sequence number
    next_seq: u64,
}

impl SaveQueue {
    /// Start a queue writing to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the writer thread cannot be spawned.
    pub fn start(path: PathBuf) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<SaveJob>();
        let target = path.clone();
        let worker = thread::Builder::new()
            .name("auditrack-save".to_string())
            .spawn(move || run_worker(&target, &receiver))
            .context("Failed to spawn save queue worker")?;

        Ok(Self {
            path,
            sender: Some(sender),
            worker: Some(worker),
            next_seq: 0,
        })
    }

    /// Destination of every write
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue a snapshot for writing after every previously queued one
    pub fn enqueue(&mut self, bytes: Vec<u8>) -> PendingSave {
        let seq = self.next_seq;
        self.next_seq += 1;

        let (done, outcome) = mpsc::channel();
        let job = SaveJob { seq, bytes, done };

        match &self.sender {
            Some(sender) => {
                if let Err(mpsc::SendError(job)) = sender.send(job) {
                    let _ = job.done.send(Err(AuditError::Persistence(
                        "save queue worker is not running".to_string(),
                    )));
                }
            }
            None => {
                let _ = job.done.send(Err(AuditError::Persistence(
                    "save queue is shut down".to_string(),
                )));
            }
        }

        PendingSave { seq, outcome }
    }

    /// Wait for every queued write and stop the worker
    pub fn shutdown(&mut self) {
        // Closing the channel lets the worker drain and exit
        self.sender.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!(path = %self.path.display(), "Save queue worker panicked");
        }
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(path: &Path, jobs: &Receiver<SaveJob>) {
    for job in jobs {
        let span = span!(Level::DEBUG, "save_snapshot", seq = job.seq);
        let _guard = span.enter();

        let outcome = write_atomic(path, &job.bytes).map_err(|e| {
            warn!(path = %path.display(), error = %format!("{e:#}"), "Failed to save review state");
            AuditError::Persistence(format!("{e:#}"))
        });
        if outcome.is_ok() {
            debug!(bytes = job.bytes.len(), "Review state saved");
        }
        // The caller may have dropped its handle; the write still counts
        let _ = job.done.send(outcome);
    }
}

/// Sidecar lock file next to the snapshot
#[must_use]
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

/// Replace `path` with `bytes` atomically under an exclusive lock
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the lock cannot be
/// taken, or the temporary file cannot be written or renamed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let lock_file = File::create(lock_path(path))
        .with_context(|| format!("Failed to create lock file for {}", path.display()))?;
    lock_file
        .lock_exclusive()
        .with_context(|| format!("Failed to lock {}", path.display()))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    temp.write_all(bytes).context("Failed to write snapshot")?;
    temp.flush().context("Failed to flush snapshot")?;
    temp.as_file()
        .sync_all()
        .context("Failed to sync snapshot")?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    FileExt::unlock(&lock_file).context("Failed to unlock state file")?;
    Ok(())
}
