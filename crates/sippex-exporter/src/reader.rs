//! Stats file reader (one tokio task per source file).
//!
//! Lifecycle: `Init -> Tailing -> Stopping -> Closed`
//! - Init: open the file, parse the header row if it is already written
//! - Tailing: read every complete row, sleep `poll_interval` at EOF, repeat
//! - Stopping: stop signal observed between iterations (never mid-row)
//! - Closed: file handle dropped
//!
//! The file is read strictly forward. A row without its trailing newline
//! stays buffered (as raw bytes) until the writer finishes it. Complete rows
//! are decoded lossily, so a stray non-UTF-8 byte only spoils its own field.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use sippex_core::error::{Result, SippexError};
use sippex_core::stats::{ingest_row, HeaderRow};
use sippex_core::{MetricTypeRegistry, SampleQueue};

/// Upper bound on data rows ingested by one `poll_once`, so the stop signal
/// is checked regularly while a large backlog is being read.
pub const MAX_ROWS_PER_POLL: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReaderState {
    Init = 0,
    Tailing = 1,
    Stopping = 2,
    Closed = 3,
}

impl ReaderState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ReaderState::Init,
            1 => ReaderState::Tailing,
            2 => ReaderState::Stopping,
            _ => ReaderState::Closed,
        }
    }
}

#[derive(Clone)]
struct StateCell(Arc<AtomicU8>);

impl StateCell {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(ReaderState::Init as u8)))
    }
    fn get(&self) -> ReaderState {
        ReaderState::from_u8(self.0.load(Ordering::Acquire))
    }
    fn set(&self, s: ReaderState) {
        self.0.store(s as u8, Ordering::Release);
    }
}

pub struct StatsReader {
    path: PathBuf,
    file: BufReader<File>,
    registry: Arc<MetricTypeRegistry>,
    queue: Arc<SampleQueue>,
    headers: Option<Arc<HeaderRow>>,
    pending: Vec<u8>,
    poll_interval: Duration,
    state: StateCell,
}

impl StatsReader {
    /// Open `path` and read its header row if present.
    ///
    /// A missing or unreadable file is an error: callers treat it as fatal
    /// at startup.
    pub async fn open(
        path: impl Into<PathBuf>,
        registry: Arc<MetricTypeRegistry>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path)
            .await
            .map_err(|e| SippexError::io(path.display().to_string(), e))?;

        let mut reader = Self {
            path,
            file: BufReader::new(file),
            registry,
            queue: Arc::new(SampleQueue::new()),
            headers: None,
            pending: Vec::new(),
            poll_interval,
            state: StateCell::new(),
        };
        reader.read_header().await?;
        Ok(reader)
    }

    pub fn queue(&self) -> Arc<SampleQueue> {
        Arc::clone(&self.queue)
    }

    pub fn headers(&self) -> Option<&HeaderRow> {
        self.headers.as_deref()
    }

    pub fn state(&self) -> ReaderState {
        self.state.get()
    }

    // Next complete line, or None at (temporary) end of file.
    async fn next_line(&mut self) -> Result<Option<String>> {
        let n = self
            .file
            .read_until(b'\n', &mut self.pending)
            .await
            .map_err(|e| SippexError::io(self.path.display().to_string(), e))?;

        if n == 0 || self.pending.last() != Some(&b'\n') {
            return Ok(None);
        }
        let raw = std::mem::take(&mut self.pending);
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    async fn read_header(&mut self) -> Result<()> {
        while self.headers.is_none() {
            let Some(line) = self.next_line().await? else { break; };
            if let Some(h) = HeaderRow::parse(&line) {
                tracing::info!(
                    path = %self.path.display(),
                    metrics = h.metric_names().count(),
                    "stats header parsed"
                );
                self.headers = Some(Arc::new(h));
            }
        }
        Ok(())
    }

    /// Ingest the complete rows available right now, at most
    /// [`MAX_ROWS_PER_POLL`] of them.
    ///
    /// Returns the number of non-empty data rows consumed (including rows
    /// rejected as malformed). `0` means the reader is idle at EOF.
    pub async fn poll_once(&mut self) -> Result<usize> {
        self.read_header().await?;
        let Some(headers) = self.headers.clone() else { return Ok(0); };

        let mut rows = 0;
        while rows < MAX_ROWS_PER_POLL {
            let Some(line) = self.next_line().await? else { break; };
            if line.trim().is_empty() {
                continue;
            }
            rows += 1;

            match ingest_row(&headers, &line, &self.registry, &self.queue) {
                Ok(report) => {
                    tracing::trace!(
                        path = %self.path.display(),
                        pushed = report.pushed,
                        skipped = report.skipped,
                        evicted = report.evicted,
                        "row ingested"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        code = e.code().as_str(),
                        error = %e,
                        "row skipped"
                    );
                }
            }
        }
        Ok(rows)
    }

    /// Move the reader onto its own task.
    pub fn spawn(self) -> ReaderHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let path = self.path.clone();
        let queue = Arc::clone(&self.queue);
        let state = self.state.clone();

        let task = tokio::spawn(self.run(stop_rx));

        ReaderHandle {
            path,
            queue,
            state,
            stop: stop_tx,
            task,
        }
    }

    async fn run(mut self, mut stop: watch::Receiver<bool>) {
        self.state.set(ReaderState::Tailing);
        tracing::info!(path = %self.path.display(), "tailing stats file");

        loop {
            if *stop.borrow() {
                break;
            }

            let idle = match self.poll_once().await {
                Ok(rows) => rows == 0,
                Err(e) => {
                    // Keep the handle and retry; other readers are unaffected.
                    tracing::warn!(
                        path = %self.path.display(),
                        code = e.code().as_str(),
                        error = %e,
                        "stats read failed"
                    );
                    true
                }
            };

            if !idle {
                tokio::task::yield_now().await;
                continue;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = stop.changed() => {
                    // handle dropped
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.state.set(ReaderState::Stopping);
        let StatsReader {
            path, file, queue, state, ..
        } = self;
        drop(file);
        state.set(ReaderState::Closed);

        tracing::info!(
            path = %path.display(),
            queued = queue.len(),
            evicted = queue.evicted(),
            "stats reader closed"
        );
    }
}

/// Control handle for a spawned reader.
pub struct ReaderHandle {
    path: PathBuf,
    queue: Arc<SampleQueue>,
    state: StateCell,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaderHandle {
    pub fn queue(&self) -> Arc<SampleQueue> {
        Arc::clone(&self.queue)
    }

    pub fn state(&self) -> ReaderState {
        self.state.get()
    }

    /// Signal the reader and wait until its file handle is released.
    /// Returns the final state (`Closed` unless the task panicked).
    pub async fn stop(self) -> ReaderState {
        self.state.set(ReaderState::Stopping);
        self.stop.send_replace(true);
        if let Err(e) = self.task.await {
            tracing::error!(path = %self.path.display(), error = %e, "stats reader task failed");
        }
        self.state.get()
    }
}
