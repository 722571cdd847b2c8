// WebSocket session handler: one streaming worker per connection.
//
// Lifecycle: CONNECTED -> spawn worker -> STREAMING -> disconnect or send
// failure -> STOPPING (stop channel closed) -> STOPPED (worker joined).

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use crossbeam::channel;
use futures::{SinkExt, StreamExt};
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::pipeline::worker::spawn_stream_worker;
use crate::pipeline::FramePayload;
use crate::web::AppState;

/// Bound on in-flight frames between the worker and the socket. The worker
/// paces itself, so this only has to absorb short delivery stalls.
const FRAME_CHANNEL_CAPACITY: usize = 8;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.stats.snapshot())
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    state.stats.sessions_opened.fetch_add(1, Ordering::Relaxed);
    info!("WebSocket connected");

    let Some(detector) = state.detector.clone() else {
        warn!("no detection model loaded, session will stream nothing");
        wait_for_close(socket).await;
        info!("WebSocket disconnected");
        return;
    };

    // Zero-capacity stop channel: closing it is the stop signal, and the
    // worker selects on it alongside its pacing tick.
    let (stop_tx, stop_rx) = channel::bounded::<()>(0);
    let (frame_tx, mut frame_rx) = mpsc::channel::<FramePayload>(FRAME_CHANNEL_CAPACITY);

    let worker = spawn_stream_worker(
        state.worker_config.clone(),
        state.open_source.clone(),
        detector,
        stop_rx,
        frame_tx,
        state.stats.clone(),
    );

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            payload = frame_rx.recv() => {
                let Some(payload) = payload else {
                    // Worker exited on its own (e.g. video open failure)
                    debug!("frame channel drained, worker is gone");
                    break;
                };
                let json = match serde_json::to_string(&payload) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("failed to serialize frame payload: {e}");
                        continue;
                    }
                };
                if let Err(e) = sender.send(Message::Text(json)).await {
                    warn!("failed to send frame, stopping stream: {e}");
                    break;
                }
                state.stats.frames_streamed.fetch_add(1, Ordering::Relaxed);
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("connection closed by client");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {e}");
                        break;
                    }
                    // No client->server payload is consumed
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    // STOPPING: signal the worker and wait for it, so no worker outlives
    // its session.
    drop(stop_tx);
    drop(frame_rx);
    match tokio::task::spawn_blocking(move || worker.join()).await {
        Ok(Ok(())) => debug!("stream worker joined"),
        Ok(Err(_)) => error!("stream worker panicked"),
        Err(e) => error!("failed to join stream worker: {e}"),
    }

    info!("WebSocket disconnected");
}

/// Hold a session open without streaming, until the peer goes away.
async fn wait_for_close(mut socket: WebSocket) {
    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
}
