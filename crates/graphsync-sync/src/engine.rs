//! Main synchronization engine

use crate::{
    diff::{DiffEngine, FileChange},
    hash::{absolute_root, workspace_id},
    progress::{ProgressReporter, SyncPhase},
    snapshot::LocalSnapshot,
    submit::{build_batch, is_bootstrap, ChangeSubmitter, SubmitOutcome},
    walker::{SkippedFile, TreeWalker},
};
use graphsync_config::ScanConfig;
use graphsync_types::{
    GraphStatus, Manifest, RelativePath, RemoteStore, Result, SyncCounts, WorkspaceId,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Synchronization request
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Workspace root
    pub root: PathBuf,
    /// Sync options
    pub options: SyncOptions,
    /// Request ID for tracking
    pub request_id: uuid::Uuid,
}

impl SyncRequest {
    /// Create a new sync request
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options: SyncOptions::default(),
            request_id: uuid::Uuid::new_v4(),
        }
    }

    /// Set sync options
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }
}

/// Synchronization options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Classify changes without submitting them
    pub dry_run: bool,
}

impl SyncOptions {
    /// Options for a dry run
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

/// How a sync run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "counts", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Nothing changed; nothing was sent
    UpToDate,
    /// The batch was submitted
    Submitted(SyncCounts),
    /// Changes were classified but not submitted
    DryRun,
}

impl SyncOutcome {
    /// Aggregate counts, all zero unless a batch was submitted
    pub fn counts(&self) -> SyncCounts {
        match self {
            Self::Submitted(counts) => *counts,
            Self::UpToDate | Self::DryRun => SyncCounts::default(),
        }
    }
}

impl From<SubmitOutcome> for SyncOutcome {
    fn from(outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::UpToDate => Self::UpToDate,
            SubmitOutcome::Submitted(counts) => Self::Submitted(counts),
        }
    }
}

/// Synchronization result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    /// Request ID
    pub request_id: uuid::Uuid,
    /// Workspace the run synchronized
    pub workspace_id: WorkspaceId,
    /// How the run ended
    pub outcome: SyncOutcome,
    /// Classified changes, sorted by path
    pub changes: Vec<FileChange>,
    /// Whether the batch was (or would be) a bootstrap
    pub replace: bool,
    /// Number of files read and hashed
    pub files_scanned: u64,
    /// Files and directories left out of the local manifest
    pub skipped: Vec<SkippedFile>,
    /// Sync duration
    pub duration: Duration,
}

impl SyncResult {
    /// Whether the run found nothing to do
    pub fn is_up_to_date(&self) -> bool {
        self.outcome == SyncOutcome::UpToDate
    }
}

/// Main synchronization engine
///
/// Generic over the remote store so the orchestration can run against the
/// HTTP client or an in-memory fake.
#[derive(Debug)]
pub struct SyncEngine<S> {
    store: S,
    walker: TreeWalker,
    diff_engine: DiffEngine,
    max_concurrent_reads: usize,
}

impl<S: RemoteStore> SyncEngine<S> {
    /// Create a sync engine with default scan configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, &ScanConfig::default())
    }

    /// Create a sync engine with custom scan configuration
    pub fn with_config(store: S, config: &ScanConfig) -> Self {
        Self {
            store,
            walker: TreeWalker::new(config),
            diff_engine: DiffEngine::from_config(config),
            max_concurrent_reads: config.max_concurrent_reads,
        }
    }

    /// Remote store the engine talks to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Perform synchronization
    pub async fn sync(&self, request: SyncRequest) -> Result<SyncResult> {
        let mut reporter = ProgressReporter::new(request.request_id);
        drop(reporter.take_event_receiver());
        self.sync_with_progress(request, &reporter).await
    }

    /// Perform synchronization, publishing phase changes to `reporter`
    pub async fn sync_with_progress(
        &self,
        request: SyncRequest,
        reporter: &ProgressReporter,
    ) -> Result<SyncResult> {
        match self.run(&request, reporter).await {
            Ok(result) => {
                reporter.completed().await;
                Ok(result)
            }
            Err(e) => {
                warn!("Sync {} failed: {}", request.request_id, e);
                reporter.failed(e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn run(&self, request: &SyncRequest, reporter: &ProgressReporter) -> Result<SyncResult> {
        let start_time = Instant::now();
        let root = absolute_root(&request.root)?;
        let workspace_id = workspace_id(&root)?;

        info!(
            "Starting sync {} of '{}' (workspace {})",
            request.request_id,
            root.display(),
            workspace_id
        );

        // Phase 1: fetch the manifest of record
        reporter.set_phase(SyncPhase::FetchingManifest).await;
        let remote = self.store.fetch_manifest(&workspace_id).await?;
        let replace = is_bootstrap(&remote);
        info!("Remote manifest lists {} files", remote.len());

        // Phase 2: walk and hash the local tree
        reporter.set_phase(SyncPhase::Walking).await;
        let walk = self.walker.walk(&root).await?;
        for skipped in &walk.skipped {
            reporter
                .file_skipped(skipped.path.clone(), skipped.reason.clone())
                .await;
        }
        let mut snapshot =
            LocalSnapshot::capture(&root, walk.files, self.max_concurrent_reads, reporter).await;
        snapshot.extend_skipped(walk.skipped);
        info!(
            "Hashed {} local files ({} skipped)",
            snapshot.len(),
            snapshot.skipped().len()
        );

        // Phase 3: classify
        reporter.set_phase(SyncPhase::Diffing).await;
        let changes = self
            .diff_engine
            .detect_changes(snapshot.manifest(), &remote);
        reporter.set_changes(changes.len() as u64).await;

        let outcome = if changes.is_empty() {
            reporter.set_phase(SyncPhase::Idle).await;
            info!("Workspace {} is up to date", workspace_id);
            SyncOutcome::UpToDate
        } else if request.options.dry_run {
            for change in &changes {
                debug!("DRY RUN: Would submit {}", change);
            }
            SyncOutcome::DryRun
        } else {
            // Phase 4: submit
            reporter.set_phase(SyncPhase::Submitting).await;
            let batch = build_batch(workspace_id.clone(), &changes, &snapshot, replace)?;
            ChangeSubmitter::new(&self.store).submit(&batch).await?.into()
        };

        let result = SyncResult {
            request_id: request.request_id,
            workspace_id,
            outcome,
            changes,
            replace,
            files_scanned: snapshot.len() as u64,
            skipped: snapshot.skipped().to_vec(),
            duration: start_time.elapsed(),
        };

        info!(
            "Sync {} finished: {:?} in {:?}",
            result.request_id, result.outcome, result.duration
        );
        Ok(result)
    }

    /// Ask a question scoped to the workspace at `root`
    pub async fn ask(&self, root: &Path, question: &str) -> Result<String> {
        let workspace_id = workspace_id(root)?;
        self.store.ask(question, &workspace_id).await
    }

    /// Stored text of `path` in the workspace at `root`
    pub async fn fetch_file(&self, root: &Path, path: &RelativePath) -> Result<String> {
        let workspace_id = workspace_id(root)?;
        self.store.fetch_file_content(&workspace_id, path).await
    }

    /// Manifest the remote store holds for the workspace at `root`
    pub async fn remote_manifest(&self, root: &Path) -> Result<Manifest> {
        let workspace_id = workspace_id(root)?;
        self.store.fetch_manifest(&workspace_id).await
    }

    /// Node counts of the remote graph
    pub async fn status(&self) -> Result<GraphStatus> {
        self.store.status().await
    }
}
