//! Integration tests for graphsync
//!
//! These tests run the full sync engine and the header documenter over HTTP
//! against an in-process graph store and check what ends up stored.

use graphsync_sync::{
    content_hash, workspace_id, HeaderScope, SyncOptions, SyncOutcome, SyncRequest,
};
use graphsync_tests::test_utils::{
    create_sample_workspace, create_workspace, http_documenter, http_engine, remove_file,
    write_file, SAMPLE_PROJECT,
};
use graphsync_tests::FakeGraphServer;
use graphsync_types::{ChangeStatus, ErrorKind, RelativePath, SyncCounts};
use rstest::rstest;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(30);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("graphsync_sync=debug,graphsync_remote=debug")
        .with_test_writer()
        .try_init();
}

async fn start_server() -> FakeGraphServer {
    init_tracing();
    FakeGraphServer::start()
        .await
        .expect("Failed to start fake graph server")
}

fn sync_posts(server: &FakeGraphServer) -> usize {
    server
        .requests()
        .iter()
        .filter(|request| request.endpoint == "sync")
        .count()
}

#[tokio::test]
async fn test_initial_sync_uploads_everything_with_replace() {
    let server = start_server().await;
    let workspace = create_workspace(&[("a.py", "x"), ("b.py", "y")]);
    let engine = http_engine(&server.base_url());

    let result = timeout(TEST_TIMEOUT, engine.sync(SyncRequest::new(workspace.path())))
        .await
        .expect("sync timed out")
        .unwrap();

    assert!(result.replace);
    assert_eq!(
        result.outcome,
        SyncOutcome::Submitted(SyncCounts {
            added: 2,
            modified: 0,
            deleted: 0,
            upserts: 2,
        })
    );

    let submissions = server.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(
        submissions[0],
        json!({
            "workspaceId": result.workspace_id.as_str(),
            "replace": true,
            "changes": [
                {"path": "a.py", "status": "added", "mode": "full", "content": "x"},
                {"path": "b.py", "status": "added", "mode": "full", "content": "y"},
            ],
        })
    );

    let stored = server.files(result.workspace_id.as_str());
    assert_eq!(stored.get("a.py").map(String::as_str), Some("x"));
    assert_eq!(stored.get("b.py").map(String::as_str), Some("y"));
}

#[tokio::test]
async fn test_unchanged_workspace_sends_nothing() {
    let server = start_server().await;
    let workspace = create_workspace(&[("a.py", "x")]);
    let ws = workspace_id(workspace.path()).unwrap();
    server.seed(ws.as_str(), "a.py", "x");

    let result = http_engine(&server.base_url())
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap();

    assert!(result.is_up_to_date());
    assert!(!result.replace);
    assert!(result.changes.is_empty());
    assert_eq!(sync_posts(&server), 0);
    let requests: Vec<(String, String)> = server
        .requests()
        .into_iter()
        .map(|request| (request.method, request.endpoint))
        .collect();
    assert_eq!(requests, vec![("GET".to_string(), "manifest".to_string())]);
}

#[tokio::test]
async fn test_modified_file_is_resent_in_full() {
    let server = start_server().await;
    let workspace = create_workspace(&[("a.py", "z")]);
    let ws = workspace_id(workspace.path()).unwrap();
    server.seed(ws.as_str(), "a.py", "x");

    let result = http_engine(&server.base_url())
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap();

    assert!(!result.replace);
    assert_eq!(result.outcome.counts().modified, 1);
    assert_eq!(
        server.submissions()[0]["changes"],
        json!([{"path": "a.py", "status": "modified", "mode": "full", "content": "z"}])
    );
    assert_eq!(server.files(ws.as_str())["a.py"], "z");
}

#[tokio::test]
async fn test_deleted_file_carries_no_content() {
    let server = start_server().await;
    let workspace = create_workspace(&[("a.py", "x")]);
    let ws = workspace_id(workspace.path()).unwrap();
    server.seed(ws.as_str(), "a.py", "x");
    server.seed(ws.as_str(), "b.py", "y");

    let result = http_engine(&server.base_url())
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap();

    assert_eq!(result.outcome.counts().deleted, 1);
    assert_eq!(
        server.submissions()[0]["changes"],
        json!([{"path": "b.py", "status": "deleted"}])
    );
    assert!(!server.files(ws.as_str()).contains_key("b.py"));
}

#[tokio::test]
async fn test_excluded_paths_are_deleted_remotely() {
    let server = start_server().await;
    let workspace = create_workspace(&[
        ("a.py", "x"),
        ("vendor/site-packages/foo.py", "vendored"),
        ("node_modules/left-pad/index.js", "module.exports = 1"),
    ]);
    let ws = workspace_id(workspace.path()).unwrap();
    server.seed(ws.as_str(), "a.py", "x");
    server.seed(ws.as_str(), "vendor/site-packages/foo.py", "vendored");

    let result = http_engine(&server.base_url())
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap();

    assert_eq!(result.files_scanned, 1);
    assert_eq!(result.changes.len(), 1);
    assert_eq!(
        result.changes[0].path,
        RelativePath::new("vendor/site-packages/foo.py")
    );
    assert_eq!(result.changes[0].status, ChangeStatus::Deleted);
    assert_eq!(
        server.files(ws.as_str()).keys().collect::<Vec<_>>(),
        vec!["a.py"]
    );
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let server = start_server().await;
    let workspace = create_sample_workspace();
    let engine = http_engine(&server.base_url());

    let first = engine.sync(SyncRequest::new(workspace.path())).await.unwrap();
    assert!(first.replace);
    assert_eq!(sync_posts(&server), 1);

    let second = engine.sync(SyncRequest::new(workspace.path())).await.unwrap();
    assert!(second.is_up_to_date());
    assert_eq!(sync_posts(&server), 1);
}

#[tokio::test]
async fn test_incremental_edits_after_bootstrap() {
    let server = start_server().await;
    let workspace = create_sample_workspace();
    let engine = http_engine(&server.base_url());
    engine.sync(SyncRequest::new(workspace.path())).await.unwrap();

    write_file(workspace.path(), "pkg/util.py", "def greet():\n    return 'hello'\n");
    write_file(workspace.path(), "pkg/new.py", "VALUE = 1\n");
    remove_file(workspace.path(), "README.md");

    let result = engine.sync(SyncRequest::new(workspace.path())).await.unwrap();

    assert!(!result.replace);
    let classified: Vec<_> = result
        .changes
        .iter()
        .map(|change| (change.path.as_str(), change.status))
        .collect();
    assert_eq!(
        classified,
        vec![
            ("README.md", ChangeStatus::Deleted),
            ("pkg/new.py", ChangeStatus::Added),
            ("pkg/util.py", ChangeStatus::Modified),
        ]
    );
    assert_eq!(
        result.outcome.counts(),
        SyncCounts {
            added: 1,
            modified: 1,
            deleted: 1,
            upserts: 2,
        }
    );
    assert_eq!(server.submissions()[1]["replace"], false);
}

#[tokio::test]
async fn test_rename_is_delete_plus_add() {
    let server = start_server().await;
    let workspace = create_workspace(&[("new_name.py", "same")]);
    let ws = workspace_id(workspace.path()).unwrap();
    server.seed(ws.as_str(), "old_name.py", "same");

    let result = http_engine(&server.base_url())
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap();

    let counts = result.outcome.counts();
    assert_eq!((counts.added, counts.deleted), (1, 1));
    assert_eq!(
        server.files(ws.as_str()).keys().collect::<Vec<_>>(),
        vec!["new_name.py"]
    );
}

#[tokio::test]
async fn test_reserved_manifest_file_is_never_sent() {
    let server = start_server().await;
    let workspace = create_workspace(&[("a.py", "x"), (".graphrag-manifest.json", "{}")]);

    let result = http_engine(&server.base_url())
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap();

    assert_eq!(result.changes.len(), 1);
    let stored = server.files(result.workspace_id.as_str());
    assert!(!stored.contains_key(".graphrag-manifest.json"));
}

#[rstest]
#[case(500)]
#[case(503)]
#[tokio::test]
async fn test_manifest_failure_aborts_before_submitting(#[case] status: u16) {
    let server = start_server().await;
    server.fail_endpoint("manifest", status);
    let workspace = create_sample_workspace();

    let err = http_engine(&server.base_url())
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status_code(), Some(status));
    assert_eq!(sync_posts(&server), 0);
}

#[tokio::test]
async fn test_submit_failure_leaves_store_untouched() {
    let server = start_server().await;
    server.fail_endpoint("sync", 503);
    let workspace = create_sample_workspace();
    let engine = http_engine(&server.base_url());

    let err = engine
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(503));

    let ws = workspace_id(workspace.path()).unwrap();
    assert!(server.files(ws.as_str()).is_empty());

    // The next run retries the whole bootstrap
    server.heal_endpoint("sync");
    let result = engine.sync(SyncRequest::new(workspace.path())).await.unwrap();
    assert!(result.replace);
    assert_eq!(server.files(ws.as_str()).len(), 4);
}

#[tokio::test]
async fn test_missing_counts_are_reported_as_zero() {
    let server = start_server().await;
    server.omit_counts(true);
    let workspace = create_workspace(&[("a.py", "x")]);

    let result = http_engine(&server.base_url())
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap();

    assert!(matches!(result.outcome, SyncOutcome::Submitted(counts) if counts.is_zero()));
    assert_eq!(server.files(result.workspace_id.as_str()).len(), 1);
}

#[tokio::test]
async fn test_dry_run_does_not_submit() {
    let server = start_server().await;
    let workspace = create_sample_workspace();

    let request = SyncRequest::new(workspace.path()).with_options(SyncOptions::dry_run());
    let result = http_engine(&server.base_url()).sync(request).await.unwrap();

    assert_eq!(result.outcome, SyncOutcome::DryRun);
    assert!(result.replace);
    assert_eq!(result.changes.len(), 4);
    assert_eq!(sync_posts(&server), 0);
}

#[tokio::test]
async fn test_unreachable_store_is_a_transport_error() {
    init_tracing();
    let workspace = create_sample_workspace();

    // Port 9 on loopback has no listener
    let err = http_engine("http://127.0.0.1:9/api/graph")
        .sync(SyncRequest::new(workspace.path()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn test_query_helpers_after_sync() {
    let server = start_server().await;
    let workspace = create_sample_workspace();
    let engine = http_engine(&server.base_url());
    engine.sync(SyncRequest::new(workspace.path())).await.unwrap();

    let manifest = engine.remote_manifest(workspace.path()).await.unwrap();
    assert_eq!(manifest.len(), 4);
    assert_eq!(
        manifest.get(&RelativePath::new("README.md")),
        Some(&content_hash(b"# sample\n"))
    );

    let content = engine
        .fetch_file(workspace.path(), &RelativePath::new("pkg/util.py"))
        .await
        .unwrap();
    assert!(content.starts_with("class Greeter:"));

    let missing = engine
        .fetch_file(workspace.path(), &RelativePath::new("nope.py"))
        .await
        .unwrap();
    assert!(missing.is_empty());

    let answer = engine
        .ask(workspace.path(), "where is greet defined?")
        .await
        .unwrap();
    assert_eq!(answer, "4 files indexed; you asked: where is greet defined?");

    let status = engine.status().await.unwrap();
    assert_eq!(status.files, 4);
    assert_eq!(status.classes, 1);
    assert_eq!(status.functions, 2);
}

#[tokio::test]
async fn test_workspaces_are_isolated() {
    let server = start_server().await;
    let first = create_workspace(&[("a.py", "first")]);
    let second = create_workspace(&[("a.py", "second")]);
    let engine = http_engine(&server.base_url());

    let a = engine.sync(SyncRequest::new(first.path())).await.unwrap();
    let b = engine.sync(SyncRequest::new(second.path())).await.unwrap();

    assert_ne!(a.workspace_id, b.workspace_id);
    assert!(a.replace && b.replace);
    assert_eq!(server.files(a.workspace_id.as_str())["a.py"], "first");
    assert_eq!(server.files(b.workspace_id.as_str())["a.py"], "second");
}

#[tokio::test]
async fn test_documented_workspace_syncs_headers_then_clears() {
    let server = start_server().await;
    let workspace = create_sample_workspace();
    let root = workspace.path();
    let documenter = http_documenter(&server.root_url());
    let scope = HeaderScope::Workspace(root.to_path_buf());

    let report = documenter.generate(&scope).await.unwrap();
    assert!(report.is_success());
    // main.py, pkg/util.py and pkg/__init__.py; README.md is not code
    assert_eq!(report.updated.len(), 3);
    let util = std::fs::read_to_string(root.join("pkg/util.py")).unwrap();
    assert!(util.contains("PURPOSE: Documents util.py"));
    assert!(util.contains("# NeuroDoc"));

    let again = documenter.generate(&scope).await.unwrap();
    assert_eq!(again.unchanged.len(), 3);
    let generated = server
        .requests()
        .iter()
        .filter(|request| request.endpoint == "api/generate-header")
        .count();
    assert_eq!(generated, 3);

    let engine = http_engine(&server.base_url());
    let synced = engine.sync(SyncRequest::new(root)).await.unwrap();
    assert!(synced.replace);
    assert!(server.files(synced.workspace_id.as_str())["pkg/util.py"].contains("# NeuroDoc"));

    let cleared = documenter.clear(&scope).await.unwrap();
    assert_eq!(cleared.updated.len(), 3);
    for (relative, content) in SAMPLE_PROJECT {
        assert_eq!(
            std::fs::read_to_string(root.join(relative)).unwrap(),
            *content,
            "{} not restored",
            relative
        );
    }

    let resynced = engine.sync(SyncRequest::new(root)).await.unwrap();
    let changes: Vec<(String, ChangeStatus)> = resynced
        .changes
        .iter()
        .map(|change| (change.path.to_string(), change.status))
        .collect();
    assert_eq!(
        changes,
        vec![
            ("main.py".to_string(), ChangeStatus::Modified),
            ("pkg/__init__.py".to_string(), ChangeStatus::Modified),
            ("pkg/util.py".to_string(), ChangeStatus::Modified),
        ]
    );
}

#[tokio::test]
async fn test_header_service_down_leaves_files_untouched() {
    let server = start_server().await;
    server.fail_endpoint("api/generate-header", 500);
    let workspace = create_workspace(&[("a.py", "x = 1\n")]);
    let documenter = http_documenter(&server.root_url());

    let report = documenter
        .generate(&HeaderScope::Folder(workspace.path().to_path_buf()))
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].reason.contains("500"));
    assert_eq!(
        std::fs::read_to_string(workspace.path().join("a.py")).unwrap(),
        "x = 1\n"
    );
}
