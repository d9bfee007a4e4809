//! Manifest difference detection

use graphsync_config::ScanConfig;
use graphsync_types::{ChangeStatus, Manifest, RelativePath};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// One classified path, before content is attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the workspace root
    pub path: RelativePath,
    /// Classification
    pub status: ChangeStatus,
}

impl FileChange {
    /// Create a new file change
    pub fn new(path: RelativePath, status: ChangeStatus) -> Self {
        Self { path, status }
    }
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8} {}", self.status, self.path)
    }
}

/// Engine classifying paths as added, modified or deleted
#[derive(Debug, Clone)]
pub struct DiffEngine {
    reserved_path: RelativePath,
}

impl DiffEngine {
    /// Create a diff engine that ignores `reserved_file` on the local side
    pub fn new<S: AsRef<str>>(reserved_file: S) -> Self {
        Self {
            reserved_path: RelativePath::new(reserved_file),
        }
    }

    /// Create a diff engine from scan configuration
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(&config.reserved_manifest_file)
    }

    /// Bookkeeping path never treated as local content
    pub fn reserved_path(&self) -> &RelativePath {
        &self.reserved_path
    }

    /// Classify every path in the union of `local` and `remote`.
    ///
    /// Unchanged paths are omitted. Each remaining path appears once, sorted.
    /// Equal hashes under different paths are never paired up, so a rename
    /// shows as one added and one deleted record.
    pub fn detect_changes(&self, local: &Manifest, remote: &Manifest) -> Vec<FileChange> {
        let mut changes = Vec::new();

        for (path, local_hash) in local.iter() {
            if *path == self.reserved_path {
                debug!("Ignoring reserved file: {}", path);
                continue;
            }

            match remote.get(path) {
                None => changes.push(FileChange::new(path.clone(), ChangeStatus::Added)),
                Some(remote_hash) if remote_hash != local_hash => {
                    changes.push(FileChange::new(path.clone(), ChangeStatus::Modified));
                }
                Some(_) => {}
            }
        }

        for path in remote.paths() {
            let present_locally = *path != self.reserved_path && local.contains(path);
            if !present_locally {
                changes.push(FileChange::new(path.clone(), ChangeStatus::Deleted));
            }
        }

        changes.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            "Detected {} changes ({} local files, {} remote)",
            changes.len(),
            local.len(),
            remote.len()
        );
        changes
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::content_hash;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn manifest(entries: &[(&str, &str)]) -> Manifest {
        entries
            .iter()
            .map(|(path, text)| (RelativePath::new(path), content_hash(text.as_bytes())))
            .collect()
    }

    fn change(path: &str, status: ChangeStatus) -> FileChange {
        FileChange::new(RelativePath::new(path), status)
    }

    #[test]
    fn test_everything_added_against_empty_remote() {
        let local = manifest(&[("b.py", "y"), ("a.py", "x")]);
        let changes = DiffEngine::default().detect_changes(&local, &Manifest::new());

        assert_eq!(
            changes,
            vec![
                change("a.py", ChangeStatus::Added),
                change("b.py", ChangeStatus::Added)
            ]
        );
    }

    #[test]
    fn test_unchanged_is_omitted() {
        let both = manifest(&[("a.py", "x")]);
        assert!(DiffEngine::default().detect_changes(&both, &both).is_empty());
    }

    #[test]
    fn test_modified_and_deleted() {
        let local = manifest(&[("a.py", "z")]);
        let remote = manifest(&[("a.py", "x"), ("b.py", "y")]);

        assert_eq!(
            DiffEngine::default().detect_changes(&local, &remote),
            vec![
                change("a.py", ChangeStatus::Modified),
                change("b.py", ChangeStatus::Deleted)
            ]
        );
    }

    #[test]
    fn test_rename_is_add_plus_delete() {
        let local = manifest(&[("new_name.py", "same")]);
        let remote = manifest(&[("old_name.py", "same")]);

        assert_eq!(
            DiffEngine::default().detect_changes(&local, &remote),
            vec![
                change("new_name.py", ChangeStatus::Added),
                change("old_name.py", ChangeStatus::Deleted)
            ]
        );
    }

    #[test]
    fn test_reserved_file_is_never_local_content() {
        let engine = DiffEngine::default();
        let local = manifest(&[(".graphrag-manifest.json", "{}"), ("a.py", "x")]);

        let changes = engine.detect_changes(&local, &manifest(&[("a.py", "x")]));
        assert!(changes.is_empty());

        let remote = manifest(&[(".graphrag-manifest.json", "{}"), ("a.py", "x")]);
        assert_eq!(
            engine.detect_changes(&local, &remote),
            vec![change(".graphrag-manifest.json", ChangeStatus::Deleted)]
        );
    }

    #[test]
    fn test_reserved_file_only_matches_at_root() {
        let local = manifest(&[("sub/.graphrag-manifest.json", "{}")]);
        let changes = DiffEngine::default().detect_changes(&local, &Manifest::new());
        assert_eq!(
            changes,
            vec![change("sub/.graphrag-manifest.json", ChangeStatus::Added)]
        );
    }

    fn arb_manifest() -> impl Strategy<Value = Manifest> {
        proptest::collection::btree_map("[a-e]{1,2}\\.py", "[xyz]", 0..8).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(path, text)| (RelativePath::new(path), content_hash(text.as_bytes())))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_classification_is_exhaustive_and_exclusive(
            local in arb_manifest(),
            remote in arb_manifest(),
        ) {
            let changes = DiffEngine::default().detect_changes(&local, &remote);

            let mut seen = BTreeSet::new();
            for change in &changes {
                prop_assert!(seen.insert(change.path.clone()), "duplicate path {}", change.path);
                let expected = match (local.get(&change.path), remote.get(&change.path)) {
                    (Some(_), None) => ChangeStatus::Added,
                    (Some(l), Some(r)) if l != r => ChangeStatus::Modified,
                    (None, Some(_)) => ChangeStatus::Deleted,
                    _ => unreachable!("unchanged path {} was classified", change.path),
                };
                prop_assert_eq!(change.status, expected);
            }

            for (path, hash) in local.iter() {
                let unchanged = remote.get(path) == Some(hash);
                prop_assert_eq!(seen.contains(path), !unchanged);
            }
            for path in remote.paths() {
                if !local.contains(path) {
                    prop_assert!(seen.contains(path));
                }
            }
        }

        #[test]
        fn prop_diff_against_itself_is_empty(local in arb_manifest()) {
            prop_assert!(DiffEngine::default().detect_changes(&local, &local).is_empty());
        }
    }
}
