//! Progress tracking for synchronization runs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

/// Phases of a sync run
///
/// A run moves `FetchingManifest → Walking → Diffing`, then either `Idle`
/// (nothing changed) or `Submitting`, and ends in `Done`. A dry run goes
/// from `Diffing` straight to `Done`. `Failed` is reachable from every
/// non-terminal phase that talks to the remote store or the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// Fetching the remote manifest
    FetchingManifest,
    /// Walking and hashing the local tree
    Walking,
    /// Classifying changes
    Diffing,
    /// Nothing to submit
    Idle,
    /// Posting the change batch
    Submitting,
    /// Finished successfully
    Done,
    /// Aborted with an error
    Failed,
}

impl SyncPhase {
    /// Whether a run in this phase may move to `next`
    pub fn can_advance_to(self, next: Self) -> bool {
        use SyncPhase::{Diffing, Done, Failed, FetchingManifest, Idle, Submitting, Walking};

        matches!(
            (self, next),
            (FetchingManifest, Walking | Failed)
                | (Walking, Diffing | Failed)
                | (Diffing, Idle | Submitting | Done | Failed)
                | (Idle, Done)
                | (Submitting, Done | Failed)
        )
    }

    /// Whether the run is over
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Snapshot of a run's progress
#[derive(Debug, Clone)]
pub struct SyncProgress {
    /// Run the progress belongs to
    pub request_id: uuid::Uuid,
    /// Current phase
    pub phase: SyncPhase,
    /// Files read and hashed so far
    pub files_scanned: u64,
    /// Files or directories skipped so far
    pub files_skipped: u64,
    /// Changes classified by the diff
    pub changes_detected: u64,
    /// When the run started
    pub start_time: Instant,
}

impl SyncProgress {
    /// Create progress for a run that is about to fetch the remote manifest
    pub fn new(request_id: uuid::Uuid) -> Self {
        Self {
            request_id,
            phase: SyncPhase::FetchingManifest,
            files_scanned: 0,
            files_skipped: 0,
            changes_detected: 0,
            start_time: Instant::now(),
        }
    }

    /// Move to `phase` if the transition is legal
    pub fn set_phase(&mut self, phase: SyncPhase) -> bool {
        if self.phase == phase {
            return true;
        }

        if !self.phase.can_advance_to(phase) {
            warn!(
                "Ignoring illegal sync phase transition {:?} -> {:?}",
                self.phase, phase
            );
            return false;
        }

        debug!("Sync phase changed to: {:?}", phase);
        self.phase = phase;
        true
    }

    /// Elapsed time since the run started
    pub fn elapsed_time(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Whether the run is over
    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }
}

/// Progress event types
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Progress update
    Update(SyncProgress),
    /// Phase changed
    PhaseChanged(SyncPhase),
    /// A file was read and hashed
    FileScanned(PathBuf),
    /// A file or directory was skipped
    FileSkipped(PathBuf, String), // path, reason
    /// Run completed
    Completed(SyncProgress),
    /// Run failed
    Failed(String),
}

/// Progress reporter for sync runs
#[derive(Debug)]
pub struct ProgressReporter {
    progress: Arc<RwLock<SyncProgress>>,
    event_tx: mpsc::UnboundedSender<ProgressEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<ProgressEvent>>,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(request_id: uuid::Uuid) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let progress = Arc::new(RwLock::new(SyncProgress::new(request_id)));

        Self {
            progress,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Get the current progress
    pub async fn get_progress(&self) -> SyncProgress {
        self.progress.read().await.clone()
    }

    /// Take the event receiver (can only be called once)
    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<ProgressEvent>> {
        self.event_rx.take()
    }

    /// Update the current phase
    pub async fn set_phase(&self, phase: SyncPhase) {
        let changed = {
            let mut progress = self.progress.write().await;
            let previous = progress.phase;
            progress.set_phase(phase) && previous != phase
        };

        if changed {
            let _ = self.event_tx.send(ProgressEvent::PhaseChanged(phase));
            self.send_update().await;
        }
    }

    /// Report a file read and hashed
    pub async fn file_scanned(&self, file: PathBuf) {
        {
            let mut progress = self.progress.write().await;
            progress.files_scanned += 1;
        }

        let _ = self.event_tx.send(ProgressEvent::FileScanned(file));
        self.send_update().await;
    }

    /// Report a skipped file or directory
    pub async fn file_skipped(&self, file: PathBuf, reason: String) {
        {
            let mut progress = self.progress.write().await;
            progress.files_skipped += 1;
        }

        let _ = self.event_tx.send(ProgressEvent::FileSkipped(file, reason));
        self.send_update().await;
    }

    /// Record the number of classified changes
    pub async fn set_changes(&self, changes: u64) {
        {
            let mut progress = self.progress.write().await;
            progress.changes_detected = changes;
        }

        self.send_update().await;
    }

    /// Report the run completed
    pub async fn completed(&self) {
        self.set_phase(SyncPhase::Done).await;

        let progress = self.get_progress().await;
        info!(
            "Sync {} completed in {:?}",
            progress.request_id,
            progress.elapsed_time()
        );
        let _ = self.event_tx.send(ProgressEvent::Completed(progress));
    }

    /// Report the run failed
    pub async fn failed(&self, error: String) {
        self.set_phase(SyncPhase::Failed).await;
        let _ = self.event_tx.send(ProgressEvent::Failed(error));
    }

    async fn send_update(&self) {
        let progress = self.get_progress().await;
        let _ = self.event_tx.send(ProgressEvent::Update(progress));
    }
}

impl Clone for ProgressReporter {
    fn clone(&self) -> Self {
        Self {
            progress: Arc::clone(&self.progress),
            event_tx: self.event_tx.clone(),
            event_rx: None, // Clone doesn't get the receiver
        }
    }
}
