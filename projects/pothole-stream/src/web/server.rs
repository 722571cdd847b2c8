use crate::cli::Args;
use crate::detect;
use crate::pipeline::worker::WorkerConfig;
use crate::pipeline::StreamStats;
use crate::video::ffmpeg_source::FfmpegSource;
use crate::video::{FrameSource, SourceFactory};
use crate::web::{assets, stream, AppState};
use anyhow::Result;
use axum::{routing::get, Router};
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub async fn run_server(args: Args) -> Result<()> {
    let detector = detect::load_detector(&args.model);

    let video = args.video.clone();
    let open_source: SourceFactory =
        Arc::new(move || FfmpegSource::open(&video).map(|s| Box::new(s) as Box<dyn FrameSource>));

    let state = AppState {
        detector,
        open_source,
        worker_config: WorkerConfig {
            min_confidence: args.min_confidence,
            target_fps: args.fps,
        },
        stats: Arc::new(StreamStats::default()),
    };

    let listener = bind_listener(args.host, args.port)?;
    let tokio_listener = tokio::net::TcpListener::from_std(listener)?;
    info!(
        "Pothole stream server started on http://{:?}",
        tokio_listener.local_addr()?
    );

    axum::serve(tokio_listener, router(state)).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(assets::index_handler))
        .route("/ws", get(stream::ws_handler))
        .route("/api/stats", get(stream::stats_handler))
        .route("/*path", get(assets::static_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn bind_listener(host: IpAddr, port: u16) -> Result<TcpListener> {
    let mut current_port = port;
    loop {
        let addr = SocketAddr::new(host, current_port);
        match TcpListener::bind(addr) {
            Ok(listener) => {
                // Set non-blocking before registering with Tokio
                listener.set_nonblocking(true)?;
                info!("Successfully bound to {}", addr);
                return Ok(listener);
            }
            Err(e) => {
                warn!("Failed to bind to {}: {}. Trying next port...", addr, e);
                current_port += 1;
                if current_port == 0 {
                    return Err(anyhow::anyhow!("No available ports found"));
                }
            }
        }
    }
}
