//! In-process graph store speaking the remote store's HTTP API
//!
//! Serves `manifest`, `file`, `sync`, `rag` and `status` under `/api/graph`
//! from an in-memory map, plus the header-comment service's
//! `api/generate-header` and `health` at the root, one request per
//! connection. Any endpoint can be given a canned answer or left hanging.

use graphsync_sync::content_hash;
use reqwest::Url;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::debug;

const API_PREFIX: &str = "/api/graph/";

/// A request the server received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Endpoint name, e.g. `manifest` or `api/generate-header`
    pub endpoint: String,
    /// Request target: path and query string
    pub target: String,
    /// Request body
    pub body: String,
}

#[derive(Debug, Default)]
struct ServerState {
    files: HashMap<String, BTreeMap<String, String>>,
    requests: Vec<RecordedRequest>,
    submissions: Vec<Value>,
    canned: HashMap<String, (u16, String)>,
    stalled: HashSet<String>,
    omit_counts: bool,
}

enum Reply {
    Respond(u16, String),
    Stall,
}

/// In-memory graph store bound to a local port
#[derive(Debug)]
pub struct FakeGraphServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
    handle: JoinHandle<()>,
}

impl FakeGraphServer {
    /// Bind to an ephemeral port and start serving
    pub async fn start() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ServerState::default()));

        let accept_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    if let Err(e) = serve_connection(socket, state).await {
                        debug!("Fake graph server connection failed: {}", e);
                    }
                });
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Base URL to configure the remote store client with
    pub fn base_url(&self) -> String {
        format!("http://{}/api/graph", self.addr)
    }

    /// Server root, the base URL of the header-comment service
    pub fn root_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer every request to `endpoint` with `status` and a JSON error
    pub fn fail_endpoint(&self, endpoint: &str, status: u16) {
        self.respond_with(
            endpoint,
            status,
            &json!({"detail": "injected failure"}).to_string(),
        );
    }

    /// Answer every request to `endpoint` with `status` and `body` verbatim
    pub fn respond_with(&self, endpoint: &str, status: u16, body: &str) {
        self.lock()
            .canned
            .insert(endpoint.to_string(), (status, body.to_string()));
    }

    /// Accept requests to `endpoint` but never answer them
    pub fn stall_endpoint(&self, endpoint: &str) {
        self.lock().stalled.insert(endpoint.to_string());
    }

    /// Serve `endpoint` normally again
    pub fn heal_endpoint(&self, endpoint: &str) {
        let mut state = self.lock();
        state.canned.remove(endpoint);
        state.stalled.remove(endpoint);
    }

    /// Leave `counts` out of sync responses
    pub fn omit_counts(&self, omit: bool) {
        self.lock().omit_counts = omit;
    }

    /// Store a file for a workspace as if an earlier sync had sent it
    pub fn seed(&self, workspace_id: &str, path: &str, content: &str) {
        self.lock()
            .files
            .entry(workspace_id.to_string())
            .or_default()
            .insert(path.to_string(), content.to_string());
    }

    /// Files stored for a workspace
    pub fn files(&self, workspace_id: &str) -> BTreeMap<String, String> {
        self.lock()
            .files
            .get(workspace_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Bodies of every accepted `POST sync`
    pub fn submissions(&self) -> Vec<Value> {
        self.lock().submissions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for FakeGraphServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(mut socket: TcpStream, state: Arc<Mutex<ServerState>>) -> io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buffer.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    let body_end = (body_start + content_length).min(buffer.len());
    let body = String::from_utf8_lossy(&buffer[body_start..body_end]).to_string();

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let reply = {
        let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        handle(&mut state, &method, &target, &body)
    };
    let (status, response_body) = match reply {
        Reply::Respond(status, body) => (status, body),
        Reply::Stall => {
            std::future::pending::<()>().await;
            return Ok(());
        }
    };

    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        response_body.len(),
        response_body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

fn handle(state: &mut ServerState, method: &str, target: &str, body: &str) -> Reply {
    let Ok(url) = Url::parse(&format!("http://localhost{}", target)) else {
        return Reply::Respond(400, json!({"detail": "bad target"}).to_string());
    };
    let endpoint = url
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or_else(|| url.path().trim_start_matches('/'))
        .to_string();
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

    state.requests.push(RecordedRequest {
        method: method.to_string(),
        endpoint: endpoint.clone(),
        target: target.to_string(),
        body: body.to_string(),
    });

    if state.stalled.contains(&endpoint) {
        return Reply::Stall;
    }
    if let Some((status, canned)) = state.canned.get(&endpoint) {
        return Reply::Respond(*status, canned.clone());
    }

    let (status, body) = route(state, method, &endpoint, &query, body);
    Reply::Respond(status, body)
}

fn route(
    state: &mut ServerState,
    method: &str,
    endpoint: &str,
    query: &HashMap<String, String>,
    body: &str,
) -> (u16, String) {
    let workspace_id = query.get("workspaceId").cloned().unwrap_or_default();

    match (method, endpoint) {
        ("GET", "manifest") => {
            let manifest: BTreeMap<&String, String> = state
                .files
                .get(&workspace_id)
                .map(|files| {
                    files
                        .iter()
                        .map(|(path, content)| (path, content_hash(content.as_bytes()).to_string()))
                        .collect()
                })
                .unwrap_or_default();
            (200, json!({ "manifest": manifest }).to_string())
        }
        ("GET", "file") => {
            let path = query.get("path").cloned().unwrap_or_default();
            let content = state
                .files
                .get(&workspace_id)
                .and_then(|files| files.get(&path).cloned());
            (200, json!({ "content": content }).to_string())
        }
        ("POST", "sync") => apply_sync(state, body),
        ("POST", "rag") => {
            let Ok(request) = serde_json::from_str::<Value>(body) else {
                return (400, json!({"detail": "invalid body"}).to_string());
            };
            let workspace_id = request["workspaceId"].as_str().unwrap_or_default();
            let indexed = state.files.get(workspace_id).map_or(0, BTreeMap::len);
            let answer = format!(
                "{} files indexed; you asked: {}",
                indexed,
                request["question"].as_str().unwrap_or_default()
            );
            (200, json!({ "answer": answer }).to_string())
        }
        ("GET", "status") => {
            let contents = state.files.values().flat_map(BTreeMap::values);
            let (mut classes, mut functions) = (0, 0);
            for content in contents {
                for line in content.lines().map(str::trim_start) {
                    if line.starts_with("class ") {
                        classes += 1;
                    } else if line.starts_with("def ") {
                        functions += 1;
                    }
                }
            }
            let files: usize = state.files.values().map(BTreeMap::len).sum();
            (
                200,
                json!({"files": files, "classes": classes, "functions": functions}).to_string(),
            )
        }
        ("POST", "api/generate-header") => generate_header(body),
        ("GET", "health") => (
            200,
            json!({"status": "healthy", "service": "AI Code Header Generator"}).to_string(),
        ),
        _ => (404, json!({"detail": "not found"}).to_string()),
    }
}

fn generate_header(body: &str) -> (u16, String) {
    let Ok(request) = serde_json::from_str::<Value>(body) else {
        return (422, json!({"detail": "invalid body"}).to_string());
    };
    let content = request["content"].as_str().unwrap_or_default();
    let filename = request["filename"].as_str().unwrap_or_default();

    let purpose = format!("Documents {}", filename);
    let (language, header) = if filename.ends_with(".py") {
        (
            "python",
            format!(
                "\"\"\"\nPURPOSE: {}\nEXAMPLE: None\nRELATED CLASSES: None\n\"\"\"\n# NeuroDoc",
                purpose
            ),
        )
    } else {
        (
            "c-like",
            format!(
                "/*\n * PURPOSE: {}\n * EXAMPLE: None\n * RELATED CLASSES: None\n */\n// NeuroDoc",
                purpose
            ),
        )
    };

    let response = json!({
        "success": true,
        "original_content": content,
        "header_comment": {"purpose": purpose, "example": "None", "related_classes": "None"},
        "modified_content": format!("{}\n\n{}", header, content),
        "language": language,
        "filename": filename,
    });
    (200, response.to_string())
}

fn apply_sync(state: &mut ServerState, body: &str) -> (u16, String) {
    let Ok(request) = serde_json::from_str::<Value>(body) else {
        return (400, json!({"detail": "invalid body"}).to_string());
    };
    let workspace_id = request["workspaceId"].as_str().unwrap_or_default().to_string();
    let replace = request["replace"].as_bool().unwrap_or(false);
    let changes = request["changes"].as_array().cloned().unwrap_or_default();

    let files = state.files.entry(workspace_id).or_default();
    if replace {
        files.clear();
    }

    let (mut added, mut modified, mut deleted) = (0, 0, 0);
    for change in &changes {
        let path = change["path"].as_str().unwrap_or_default().to_string();
        match change["status"].as_str() {
            Some("added") | Some("modified") => {
                let content = change["content"].as_str().unwrap_or_default().to_string();
                if files.insert(path, content).is_some() {
                    modified += 1;
                } else {
                    added += 1;
                }
            }
            Some("deleted") => {
                if files.remove(&path).is_some() {
                    deleted += 1;
                }
            }
            _ => return (400, json!({"detail": "unknown status"}).to_string()),
        }
    }

    state.submissions.push(request);

    if state.omit_counts {
        return (200, json!({"success": true}).to_string());
    }
    let counts = json!({
        "added": added,
        "modified": modified,
        "deleted": deleted,
        "upserts": added + modified,
    });
    (200, json!({"success": true, "counts": counts}).to_string())
}
