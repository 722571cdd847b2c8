pub mod rtdetr;
pub mod stub;

use anyhow::Result;
use image::RgbImage;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// One predicted object instance for a single frame.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub bbox: BBox,
    pub confidence: f32,
    pub class_id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl Detection {
    /// Annotation label, e.g. `"pothole 0.87"`.
    pub fn label(&self) -> String {
        format!(
            "{} {:.2}",
            self.class_name.as_deref().unwrap_or("object"),
            self.confidence
        )
    }
}

/// Detector backend trait.
///
/// Implementations must treat the frame as read-only and ephemeral; nothing
/// is retained between calls. `detect` takes `&mut self` because inference
/// runtimes mutate internal buffers.
pub trait Detector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on one frame.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;
}

/// A detector instance shared across sessions. Inference calls are
/// serialized through the mutex; the underlying runtime is not assumed to
/// support concurrent invocation.
pub type SharedDetector = Arc<Mutex<dyn Detector>>;

/// Load the detection model once at startup.
///
/// A load failure is logged and returns `None`: the server still comes up,
/// sessions simply stream nothing.
pub fn load_detector(model_path: &Path) -> Option<SharedDetector> {
    match rtdetr::RtdetrDetector::load(model_path) {
        Ok(detector) => {
            tracing::info!(
                "{} detection model loaded from {}",
                detector.name(),
                model_path.display()
            );
            Some(Arc::new(Mutex::new(detector)))
        }
        Err(e) => {
            tracing::error!("failed to load detection model: {e:#}");
            None
        }
    }
}
