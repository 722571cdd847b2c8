pub mod assets;
pub mod server;
pub mod stream;

use std::sync::Arc;

use crate::detect::SharedDetector;
use crate::pipeline::worker::WorkerConfig;
use crate::pipeline::StreamStats;
use crate::video::SourceFactory;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the model failed to load at startup; sessions then
    /// stream nothing instead of failing.
    pub detector: Option<SharedDetector>,
    pub open_source: SourceFactory,
    pub worker_config: WorkerConfig,
    pub stats: Arc<StreamStats>,
}
