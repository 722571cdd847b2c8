pub mod annotate;
pub mod encode;
pub mod worker;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Streamed frames are resized to a fixed small resolution to bound
/// bandwidth and per-frame latency.
pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 360;

/// One wire message per frame, serialized to a JSON text message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramePayload {
    /// Base64-encoded JPEG bytes of the annotated frame.
    pub image: String,
    pub pothole_count: usize,
}

/// Counters shared between streaming sessions and the stats endpoint.
#[derive(Debug, Default)]
pub struct StreamStats {
    pub sessions_opened: AtomicU64,
    pub active_workers: AtomicUsize,
    pub frames_streamed: AtomicU64,
}

impl StreamStats {
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "sessions_opened": self.sessions_opened.load(Ordering::Relaxed),
            "active_workers": self.active_workers.load(Ordering::Relaxed),
            "frames_streamed": self.frames_streamed.load(Ordering::Relaxed),
        })
    }
}
