//! JSON output structures for the graphsync CLI

use graphsync_sync::{SyncOutcome, SyncResult};
use graphsync_types::{ChangeStatus, SyncCounts};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete JSON output for sync runs
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResultJson {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// How the run ended
    pub outcome: OutcomeJson,
    /// Whether the batch was (or would be) a bootstrap
    pub replace: bool,
    /// Counts reported by the remote store
    pub counts: SyncCounts,
    /// Classified changes
    pub changes: Vec<ChangeJson>,
    /// Scan statistics
    pub scan: ScanStatsJson,
}

/// Operation metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// graphsync version
    pub version: String,
    /// Operation type
    pub operation: String,
    /// Timestamp when the output was produced
    pub timestamp: String,
    /// Request id of the run
    pub request_id: String,
    /// Workspace root as given
    pub workspace_root: String,
    /// Workspace id
    pub workspace_id: String,
}

/// Run outcome in JSON format
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeJson {
    UpToDate,
    Submitted,
    DryRun,
}

impl From<SyncOutcome> for OutcomeJson {
    fn from(outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::UpToDate => OutcomeJson::UpToDate,
            SyncOutcome::Submitted(_) => OutcomeJson::Submitted,
            SyncOutcome::DryRun => OutcomeJson::DryRun,
        }
    }
}

/// One classified path
#[derive(Debug, Serialize, Deserialize)]
pub struct ChangeJson {
    /// Relative path
    pub path: String,
    /// added, modified or deleted
    pub status: ChangeStatus,
}

/// Scan statistics in JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanStatsJson {
    /// Files read and hashed
    pub files_scanned: u64,
    /// Skipped files and directories
    pub skipped: Vec<SkippedJson>,
    /// Duration in seconds
    pub duration_seconds: f64,
}

/// A skipped path
#[derive(Debug, Serialize, Deserialize)]
pub struct SkippedJson {
    /// Absolute path
    pub path: String,
    /// Reason it was skipped
    pub reason: String,
}

impl SyncResultJson {
    /// Create a new SyncResultJson from a sync result
    pub fn new(root: &Path, result: &SyncResult) -> Self {
        Self {
            metadata: OperationMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                operation: "sync".to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                request_id: result.request_id.to_string(),
                workspace_root: root.display().to_string(),
                workspace_id: result.workspace_id.to_string(),
            },
            outcome: result.outcome.into(),
            replace: result.replace,
            counts: result.outcome.counts(),
            changes: result
                .changes
                .iter()
                .map(|change| ChangeJson {
                    path: change.path.to_string(),
                    status: change.status,
                })
                .collect(),
            scan: ScanStatsJson {
                files_scanned: result.files_scanned,
                skipped: result
                    .skipped
                    .iter()
                    .map(|skipped| SkippedJson {
                        path: skipped.path.display().to_string(),
                        reason: skipped.reason.clone(),
                    })
                    .collect(),
                duration_seconds: result.duration.as_secs_f64(),
            },
        }
    }
}
