use anyhow::Result;
use image::RgbImage;

use super::{Detection, Detector};

/// Stub detector for testing. Returns the same canned detections for every
/// frame, regardless of pixel content.
pub struct StubDetector {
    detections: Vec<Detection>,
}

impl StubDetector {
    /// A stub that never detects anything.
    pub fn empty() -> Self {
        Self {
            detections: Vec::new(),
        }
    }

    pub fn with_detections(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::empty()
    }
}

impl Detector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>> {
        Ok(self.detections.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BBox;

    #[test]
    fn stub_returns_canned_detections() {
        let det = Detection {
            bbox: BBox {
                x: 10.0,
                y: 10.0,
                w: 40.0,
                h: 30.0,
            },
            confidence: 0.9,
            class_id: 0,
            class_name: Some("pothole".to_string()),
        };
        let mut stub = StubDetector::with_detections(vec![det]);
        let frame = RgbImage::new(64, 64);

        let out = stub.detect(&frame).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class_name.as_deref(), Some("pothole"));

        let mut empty = StubDetector::empty();
        assert!(empty.detect(&frame).unwrap().is_empty());
    }
}
