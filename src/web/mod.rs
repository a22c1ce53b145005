mod assets;
mod control;

use std::{
    convert::Infallible,
    net::SocketAddr,
    path::{Component, Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode, Uri},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{info, warn};

pub use control::{ControlLoopStopped, GameHandle};

use crate::{
    catalog::Catalog,
    config::ServerConfig,
    protocol::{Audience, ClientId, ClientMessage, ServerMessage},
    service::GameService,
    world::GameState,
};

#[derive(Clone)]
pub struct AppState {
    game: GameHandle,
    next_client: Arc<AtomicU64>,
    dist_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(game: GameHandle, dist_dir: PathBuf) -> Self {
        Self {
            game,
            next_client: Arc::new(AtomicU64::new(1)),
            dist_dir: Arc::new(dist_dir),
        }
    }
}

pub struct WebServerConfig {
    pub server: ServerConfig,
    pub catalog: Catalog,
    pub dist_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        server,
        catalog,
        dist_dir,
        host,
        port,
    } = config;

    let game = GameHandle::spawn(GameService::new(server, catalog), Duration::from_secs(1));
    let router = router(AppState::new(game, dist_dir));

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("server running on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/status", get(status))
        .route("/api/state", get(latest_state))
        .route("/api/events", get(stream_events))
        .route("/ws", get(socket_upgrade))
        .fallback(spa)
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

async fn healthz() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    turn: u64,
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = state
        .game
        .snapshot()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(StatusResponse {
        status: "ok",
        turn: snapshot.current_turn,
    }))
}

async fn latest_state(State(state): State<AppState>) -> Result<Json<GameState>, StatusCode> {
    state
        .game
        .snapshot()
        .await
        .map(Json)
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
}

/// Read-only feed of every broadcast addressed to all clients, for
/// projector/spectator displays.
async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.game.subscribe()).filter_map(|msg| match msg {
        Ok(out) if out.audience == Audience::Everyone => serde_json::to_string(&out.message)
            .ok()
            .map(|payload| Ok(Event::default().data(payload))),
        _ => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}

async fn socket_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| client_session(socket, state))
}

async fn client_session(mut socket: WebSocket, state: AppState) {
    let client = ClientId(state.next_client.fetch_add(1, Ordering::Relaxed));
    info!(client = client.0, "client connected");

    // Subscribe before taking the snapshot so nothing falls in between.
    let mut rx = state.game.subscribe();
    if send_snapshot(&mut socket, &state.game).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(message) => {
                                if state.game.send(client, message).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => warn!(client = client.0, %err, "ignoring malformed message"),
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
            outgoing = rx.recv() => {
                match outgoing {
                    Ok(out) => {
                        if !out.audience.includes(client) {
                            continue;
                        }
                        if send_message(&mut socket, &out.message).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(client = client.0, skipped, "client lagged, resending snapshot");
                        if send_snapshot(&mut socket, &state.game).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    info!(client = client.0, "client disconnected");
}

async fn send_snapshot(socket: &mut WebSocket, game: &GameHandle) -> Result<(), axum::Error> {
    let snapshot = game.snapshot().await.map_err(axum::Error::new)?;
    send_message(socket, &ServerMessage::StateUpdate(Box::new(snapshot))).await
}

async fn send_message(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(message).map_err(axum::Error::new)?;
    socket.send(Message::Text(payload)).await
}

/// Serves the built single-page app: the requested file when it exists,
/// otherwise its `index.html`, otherwise the embedded placeholder page.
async fn spa(State(state): State<AppState>, uri: Uri) -> Response {
    if let Some(relative) = safe_relative_path(uri.path()) {
        let candidate = state.dist_dir.join(&relative);
        if let Ok(contents) = tokio::fs::read(&candidate).await {
            return file_response(&candidate, contents);
        }
    }
    let index = state.dist_dir.join("index.html");
    match tokio::fs::read(&index).await {
        Ok(contents) => file_response(&index, contents),
        Err(_) => (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            Body::from(Bytes::from_static(assets::INDEX_HTML.as_bytes())),
        )
            .into_response(),
    }
}

fn file_response(path: &Path, contents: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, content_type(path))], contents).into_response()
}

fn safe_relative_path(uri_path: &str) -> Option<PathBuf> {
    let relative = Path::new(uri_path.trim_start_matches('/'));
    if relative.as_os_str().is_empty() {
        return None;
    }
    relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
        .then(|| relative.to_path_buf())
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
