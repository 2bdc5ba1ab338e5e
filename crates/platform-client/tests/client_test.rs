//! Platform client tests against an in-process platform server

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ctf_build_logs::{OpenedAs, SessionOutcome, ViewerConfig, ViewerController};
use ctf_core::{BuildLogSource, BuildStatus, ChallengeSource, SourceError};
use ctf_platform_client::{PlatformClient, PlatformClientConfig};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakePlatform {
    auth_headers: Mutex<Vec<String>>,
}

impl FakePlatform {
    fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        self.auth_headers.lock().unwrap().push(value);
    }
}

type Shared = Arc<FakePlatform>;

async fn get_challenge(
    State(platform): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    platform.record(&headers);
    if id == "c1" {
        Json(json!({
            "challenge": {
                "challenge_id": "c1",
                "name": "Format Strings 101",
                "genre": "pwn",
                "points": 300,
                "requires_instance": true
            },
            "error_message": ""
        }))
    } else {
        Json(json!({ "error_message": "challenge not found" }))
    }
}

async fn list_build_logs(
    State(platform): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    platform.record(&headers);
    Json(json!({
        "logs": [
            {
                "job_id": "j2",
                "challenge_id": id,
                "status": "building",
                "created_at": "2026-10-01T12:00:00Z"
            },
            {
                "job_id": "j1",
                "challenge_id": id,
                "status": "success",
                "created_at": "2026-09-30T08:00:00Z",
                "completed_at": "2026-09-30T08:03:12Z"
            }
        ]
    }))
}

async fn get_build_log(
    State(platform): State<Shared>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response {
    platform.record(&headers);
    match job_id.as_str() {
        "j1" => Json(json!({
            "log_content": "Step 1/1 : FROM alpine\nSuccessfully built\n",
            "status": "success"
        }))
        .into_response(),
        "broken" => Json(json!({ "error_message": "storage unavailable" })).into_response(),
        "crash" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => (StatusCode::NOT_FOUND, "missing").into_response(),
    }
}

async fn stream_build_log(
    ws: WebSocketUpgrade,
    State(platform): State<Shared>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response {
    platform.record(&headers);
    if job_id != "j2" {
        return (StatusCode::NOT_FOUND, "missing").into_response();
    }
    ws.on_upgrade(send_build)
}

async fn send_build(socket: WebSocket) {
    let (mut sender, _receiver) = socket.split();
    let frames = [
        json!({"line": "Step 1/2 : FROM alpine\n", "status": "building", "is_complete": false})
            .to_string(),
        "Step 2/2 : RUN make".to_string(),
        "BUILD_COMPLETE:success:sha256:4f1c".to_string(),
    ];
    for frame in frames {
        if sender.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }
    let _ = sender.send(Message::Close(None)).await;
}

async fn spawn_platform() -> (SocketAddr, Shared) {
    let platform = Arc::new(FakePlatform::default());
    let app = Router::new()
        .route("/api/v1/admin/challenges/:id", get(get_challenge))
        .route("/api/v1/admin/challenges/:id/build-logs", get(list_build_logs))
        .route("/api/v1/admin/build-logs/:job_id", get(get_build_log))
        .route(
            "/api/v1/admin/build-logs/:job_id/stream",
            get(stream_build_log),
        )
        .with_state(platform.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local server");
    let addr = listener.local_addr().expect("read addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, platform)
}

fn client_for(addr: SocketAddr) -> PlatformClient {
    let config = PlatformClientConfig::new(format!("http://{}", addr))
        .expect("valid url")
        .with_auth_token("admin-token");
    PlatformClient::new(config).expect("build client")
}

#[tokio::test]
async fn test_fetch_snapshot() {
    let (addr, platform) = spawn_platform().await;
    let client = client_for(addr);

    let snapshot = client.fetch_snapshot("j1").await.unwrap();
    assert_eq!(snapshot.content, "Step 1/1 : FROM alpine\nSuccessfully built\n");
    assert_eq!(snapshot.status, BuildStatus::Success);
    assert_eq!(
        platform.auth_headers.lock().unwrap().as_slice(),
        ["Bearer admin-token"]
    );
}

#[tokio::test]
async fn test_snapshot_errors() {
    let (addr, _platform) = spawn_platform().await;
    let client = client_for(addr);

    assert!(client.fetch_snapshot("nope").await.unwrap_err().is_not_found());
    assert_eq!(
        client.fetch_snapshot("broken").await.unwrap_err(),
        SourceError::Remote("storage unavailable".into())
    );
    assert_eq!(
        client.fetch_snapshot("crash").await.unwrap_err(),
        SourceError::Remote("HTTP 500: boom".into())
    );
}

#[tokio::test]
async fn test_list_summaries_keeps_order() {
    let (addr, _platform) = spawn_platform().await;
    let client = client_for(addr);

    let summaries = client.list_summaries("c1").await.unwrap();
    let ids: Vec<_> = summaries.iter().map(|s| s.job_id.as_str()).collect();
    assert_eq!(ids, vec!["j2", "j1"]);
    assert_eq!(summaries[0].status, BuildStatus::Building);
    assert!(summaries[0].completed_at.is_none());
    assert!(summaries[1].completed_at.is_some());
    assert_eq!(summaries[1].challenge_id, "c1");
}

#[tokio::test]
async fn test_get_challenge() {
    let (addr, _platform) = spawn_platform().await;
    let client = client_for(addr);

    let challenge = client.get_challenge("c1").await.unwrap();
    assert_eq!(challenge.name, "Format Strings 101");
    assert_eq!(challenge.points, 300);
    assert!(challenge.requires_instance);

    assert!(client.get_challenge("c404").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_stream_decodes_all_frame_shapes() {
    let (addr, platform) = spawn_platform().await;
    let client = client_for(addr);

    let stream = client.open_stream("j2").await.unwrap();
    let chunks: Vec<_> = stream.collect().await;
    let chunks: Vec<_> = chunks.into_iter().map(|c| c.unwrap()).collect();

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].line, "Step 1/2 : FROM alpine\n");
    assert_eq!(chunks[1].line, "Step 2/2 : RUN make\n");
    assert_eq!(chunks[1].status, BuildStatus::Building);
    assert!(chunks[2].is_complete);
    assert_eq!(chunks[2].status, BuildStatus::Success);
    assert!(platform
        .auth_headers
        .lock()
        .unwrap()
        .iter()
        .all(|h| h == "Bearer admin-token"));
}

#[tokio::test]
async fn test_stream_unknown_job() {
    let (addr, _platform) = spawn_platform().await;
    let client = client_for(addr);

    let err = client.open_stream("j9").await.err().unwrap();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_viewer_over_platform_client() {
    let (addr, _platform) = spawn_platform().await;
    let client = Arc::new(client_for(addr));
    let viewer = ViewerController::new(client.clone(), client, ViewerConfig::default());

    viewer.enter(Some("c1"), None).await;
    assert_eq!(viewer.state().summaries.len(), 2);

    assert_eq!(viewer.open("j2", None).await, OpenedAs::Streaming);
    assert_eq!(
        viewer.sessions().wait().await,
        Some(SessionOutcome::Completed)
    );

    let log = viewer.state().selected_log.expect("log displayed");
    assert_eq!(log.content, "Step 1/2 : FROM alpine\nStep 2/2 : RUN make\n");
    assert_eq!(log.status, BuildStatus::Success);

    assert_eq!(viewer.open("j1", None).await, OpenedAs::Snapshot);
    let log = viewer.state().selected_log.expect("log displayed");
    assert_eq!(log.status, BuildStatus::Success);
}
