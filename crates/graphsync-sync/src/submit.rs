//! Change batch construction and submission

use crate::diff::FileChange;
use crate::snapshot::LocalSnapshot;
use graphsync_types::{
    ChangeBatch, ChangeRecord, ChangeStatus, Error, Manifest, RemoteStore, Result, SyncCounts,
    WorkspaceId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// What a submission did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "counts", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Nothing changed; no request was sent
    UpToDate,
    /// The batch was accepted; counts are as reported by the store
    Submitted(SyncCounts),
}

impl SubmitOutcome {
    /// Aggregate counts, all zero when nothing was sent
    pub fn counts(&self) -> SyncCounts {
        match self {
            Self::UpToDate => SyncCounts::default(),
            Self::Submitted(counts) => *counts,
        }
    }
}

/// A sync is a bootstrap iff the remote store knew nothing about the workspace
pub fn is_bootstrap(remote: &Manifest) -> bool {
    remote.is_empty()
}

/// Attach content to classified changes.
///
/// Added and modified records carry the full text captured during the walk;
/// deleted records carry nothing.
pub fn build_batch(
    workspace_id: WorkspaceId,
    changes: &[FileChange],
    snapshot: &LocalSnapshot,
    replace: bool,
) -> Result<ChangeBatch> {
    let records = changes
        .iter()
        .map(|change| match change.status {
            ChangeStatus::Deleted => Ok(ChangeRecord::deleted(change.path.clone())),
            status => {
                let content = snapshot.content(&change.path).ok_or_else(|| {
                    Error::sync(format!("No scanned content for {} path '{}'", status, change.path))
                })?;
                Ok(if status == ChangeStatus::Added {
                    ChangeRecord::added(change.path.clone(), content.to_string())
                } else {
                    ChangeRecord::modified(change.path.clone(), content.to_string())
                })
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ChangeBatch::new(workspace_id, records, replace))
}

/// Posts change batches to a remote store
#[derive(Debug)]
pub struct ChangeSubmitter<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: RemoteStore + ?Sized> ChangeSubmitter<'a, S> {
    /// Create a submitter for `store`
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Submit `batch`; an empty batch is a no-op without any network call
    pub async fn submit(&self, batch: &ChangeBatch) -> Result<SubmitOutcome> {
        if batch.is_empty() {
            info!("Workspace {} is up to date", batch.workspace_id);
            return Ok(SubmitOutcome::UpToDate);
        }

        let counts = self.store.submit(batch).await?;
        info!(
            "Remote store applied batch: {} added, {} modified, {} deleted, {} upserts",
            counts.added, counts.modified, counts.deleted, counts.upserts
        );
        Ok(SubmitOutcome::Submitted(counts))
    }
}
