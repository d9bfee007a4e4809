//! In-memory service fakes for unit tests

use crate::hash::content_hash;
use async_trait::async_trait;
use graphsync_types::{
    ChangeBatch, ChangeStatus, Error, GraphStatus, HeaderGenerator, Manifest, RelativePath,
    RemoteStore, Result, ServiceHealth, SyncCounts, WorkspaceId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Manifest,
    Submit,
}

/// Remote store that applies batches to an in-memory map
#[derive(Debug, Default)]
pub struct FakeRemoteStore {
    files: Mutex<HashMap<WorkspaceId, BTreeMap<RelativePath, String>>>,
    submissions: Mutex<Vec<ChangeBatch>>,
    counts: Option<Option<SyncCounts>>,
    failure: Option<(FailOn, Error)>,
}

impl FakeRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every submission with `counts` instead of computing them
    pub fn with_counts(mut self, counts: Option<SyncCounts>) -> Self {
        self.counts = Some(counts);
        self
    }

    pub fn failing(mut self, on: FailOn, error: Error) -> Self {
        self.failure = Some((on, error));
        self
    }

    pub fn seed(&self, workspace_id: &WorkspaceId, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .entry(workspace_id.clone())
            .or_default()
            .insert(RelativePath::new(path), content.to_string());
    }

    pub fn submissions(&self) -> Vec<ChangeBatch> {
        self.submissions.lock().unwrap().clone()
    }

    fn fail(&self, on: FailOn) -> Result<()> {
        match &self.failure {
            Some((failing, error)) if *failing == on => Err(error.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemoteStore {
    async fn fetch_manifest(&self, workspace_id: &WorkspaceId) -> Result<Manifest> {
        self.fail(FailOn::Manifest)?;
        let files = self.files.lock().unwrap();
        Ok(files
            .get(workspace_id)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(path, text)| (path.clone(), content_hash(text.as_bytes())))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_file_content(
        &self,
        workspace_id: &WorkspaceId,
        path: &RelativePath,
    ) -> Result<String> {
        let files = self.files.lock().unwrap();
        Ok(files
            .get(workspace_id)
            .and_then(|entries| entries.get(path).cloned())
            .unwrap_or_default())
    }

    async fn submit(&self, batch: &ChangeBatch) -> Result<SyncCounts> {
        self.fail(FailOn::Submit)?;
        self.submissions.lock().unwrap().push(batch.clone());

        let mut files = self.files.lock().unwrap();
        let entries = files.entry(batch.workspace_id.clone()).or_default();
        if batch.replace {
            entries.clear();
        }

        let mut counts = SyncCounts::default();
        for record in &batch.changes {
            match record.status {
                ChangeStatus::Added | ChangeStatus::Modified => {
                    let content = record.content.clone().unwrap_or_default();
                    if entries.insert(record.path.clone(), content).is_some() {
                        counts.modified += 1;
                    } else {
                        counts.added += 1;
                    }
                    counts.upserts += 1;
                }
                ChangeStatus::Deleted => {
                    if entries.remove(&record.path).is_some() {
                        counts.deleted += 1;
                    }
                }
            }
        }

        Ok(self.counts.unwrap_or(Some(counts)).unwrap_or_default())
    }

    async fn ask(&self, question: &str, workspace_id: &WorkspaceId) -> Result<String> {
        Ok(format!("{} asked: {}", workspace_id, question))
    }

    async fn status(&self) -> Result<GraphStatus> {
        let files = self.files.lock().unwrap();
        Ok(GraphStatus {
            files: files.values().map(|entries| entries.len() as u64).sum(),
            classes: 0,
            functions: 0,
        })
    }
}

/// Header generator that prepends a fixed header and records file names
#[derive(Debug, Default)]
pub struct FakeHeaderGenerator {
    requests: Mutex<Vec<String>>,
    failing: Vec<String>,
}

impl FakeHeaderGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject requests for `filename`
    pub fn failing_for(mut self, filename: &str) -> Self {
        self.failing.push(filename.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HeaderGenerator for FakeHeaderGenerator {
    async fn generate_header(&self, content: &str, filename: &str) -> Result<String> {
        self.requests.lock().unwrap().push(filename.to_string());
        if self.failing.iter().any(|f| f == filename) {
            return Err(Error::protocol(format!("no header for {}", filename)));
        }

        let header = if filename.ends_with(".py") {
            format!(
                "\"\"\"\nPURPOSE: Documents {}\nEXAMPLE: None\nRELATED CLASSES: None\n\"\"\"\n# NeuroDoc",
                filename
            )
        } else {
            format!(
                "/*\n * PURPOSE: Documents {}\n * EXAMPLE: None\n * RELATED CLASSES: None\n */\n// NeuroDoc",
                filename
            )
        };
        Ok(format!("{}\n\n{}", header, content))
    }

    async fn health(&self) -> Result<ServiceHealth> {
        Ok(ServiceHealth {
            status: "healthy".to_string(),
            service: "fake".to_string(),
        })
    }
}
