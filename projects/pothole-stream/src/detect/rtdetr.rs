use anyhow::{anyhow, Result};
use image::{DynamicImage, RgbImage};
use std::path::Path;
use usls::models::RTDETR;
use usls::{Config, Image};

use super::{BBox, Detection, Detector};

/// A wrapper around the USLS RT-DETR model that corrects for aspect-ratio
/// padding bugs in the underlying model library.
pub struct RtdetrDetector {
    model: RTDETR,
}

impl RtdetrDetector {
    /// Load the model from a pretrained weights file.
    pub fn load(model_path: &Path) -> Result<Self> {
        let path = model_path
            .to_str()
            .ok_or_else(|| anyhow!("model path is not valid UTF-8"))?;

        let config = Config::default()
            .with_model_file(path)
            .with_class_names(&["pothole"]);

        let config = config.commit()?;
        let model = RTDETR::new(config)?;
        Ok(Self { model })
    }
}

impl Detector for RtdetrDetector {
    fn name(&self) -> &'static str {
        "rtdetr"
    }

    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        let img_w = frame.width() as f32;
        let img_h = frame.height() as f32;

        // Correction for the library's square-padding of non-square inputs
        let (x_corr, y_corr) = if img_w > img_h {
            (img_w / img_h, 1.0)
        } else if img_h > img_w {
            (1.0, img_h / img_w)
        } else {
            (1.0, 1.0)
        };

        let input = Image::from(DynamicImage::ImageRgb8(frame.clone()));
        let results = self.model.forward(&[input])?;

        let mut detections = Vec::new();
        for result in results {
            for hbb in result.hbbs {
                detections.push(Detection {
                    bbox: BBox {
                        x: hbb.xmin() * x_corr,
                        y: hbb.ymin() * y_corr,
                        w: hbb.width() * x_corr,
                        h: hbb.height() * y_corr,
                    },
                    confidence: hbb.confidence().unwrap_or(0.0),
                    class_id: hbb.id().unwrap_or(0),
                    class_name: hbb.name().map(|s| s.to_string()),
                });
            }
        }

        Ok(detections)
    }
}
