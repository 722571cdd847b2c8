// Stream worker: the blocking read-detect-annotate-encode loop behind one
// connection. Runs on a dedicated thread and hands payloads to the async
// delivery context through a bounded channel.

use anyhow::{anyhow, Context, Result};
use crossbeam::channel::{tick, Receiver};
use crossbeam::select;
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::detect::{Detection, SharedDetector};
use crate::pipeline::{annotate, encode, FramePayload, StreamStats, FRAME_HEIGHT, FRAME_WIDTH};
use crate::video::{FrameSource, SourceFactory};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Detections below this confidence are dropped before annotation.
    pub min_confidence: f32,
    /// Pacing rate for the stream, frames per second.
    pub target_fps: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            target_fps: 24.0,
        }
    }
}

/// Spawn the worker thread for one session and track it in the shared
/// counters. The returned handle must be joined on teardown so no worker
/// outlives its session.
pub fn spawn_stream_worker(
    config: WorkerConfig,
    open_source: SourceFactory,
    detector: SharedDetector,
    stop_rx: Receiver<()>,
    frame_tx: mpsc::Sender<FramePayload>,
    stats: Arc<StreamStats>,
) -> thread::JoinHandle<()> {
    stats.active_workers.fetch_add(1, Ordering::Relaxed);
    thread::spawn(move || {
        tracing::debug!("stream worker starting");
        let result = open_source()
            .context("open video source")
            .and_then(|source| stream_worker(source, detector, &config, stop_rx, frame_tx));

        stats.active_workers.fetch_sub(1, Ordering::Relaxed);
        match result {
            Ok(()) => tracing::debug!("stream worker finished"),
            Err(e) => tracing::error!("stream worker failed: {e:#}"),
        }
    })
}

/// Read-detect-annotate-encode loop. Exits when the stop channel fires or
/// closes, or when the frame channel's receiver is gone.
pub fn stream_worker(
    mut source: Box<dyn FrameSource>,
    detector: SharedDetector,
    config: &WorkerConfig,
    stop_rx: Receiver<()>,
    frame_tx: mpsc::Sender<FramePayload>,
) -> Result<()> {
    let interval = Duration::from_secs_f64(1.0 / config.target_fps.max(1.0));
    let ticker = tick(interval);

    loop {
        select! {
            recv(stop_rx) -> _ => {
                tracing::debug!("stop requested, stream worker exiting");
                break;
            }
            recv(ticker) -> _ => {
                let frame = match source.next_frame() {
                    Ok(frame) => frame,
                    Err(_) => {
                        // End of stream is not an error: restart from the top
                        tracing::debug!("video ended, looping");
                        source.rewind().context("rewind video source")?;
                        continue;
                    }
                };

                let payload = match process_frame(&frame, &detector, config.min_confidence) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!("skipping frame: {e:#}");
                        continue;
                    }
                };

                if frame_tx.blocking_send(payload).is_err() {
                    tracing::debug!("frame channel closed, stream worker exiting");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Resize, detect, annotate, encode. A failure here spoils only this frame.
fn process_frame(
    frame: &RgbImage,
    detector: &SharedDetector,
    min_confidence: f32,
) -> Result<FramePayload> {
    let resized = imageops::resize(frame, FRAME_WIDTH, FRAME_HEIGHT, FilterType::Triangle);

    let detections: Vec<Detection> = {
        let mut detector = detector
            .lock()
            .map_err(|_| anyhow!("detector mutex poisoned"))?;
        detector.detect(&resized)?
    };
    let detections: Vec<Detection> = detections
        .into_iter()
        .filter(|d| d.confidence >= min_confidence)
        .collect();

    let annotated = annotate::draw_detections(&resized, &detections);

    Ok(FramePayload {
        image: encode::to_base64_jpeg(&annotated)?,
        pothole_count: detections.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::stub::StubDetector;
    use crate::detect::{BBox, Detector};
    use image::Rgb;
    use std::sync::Mutex;

    fn shared(detector: impl Detector + 'static) -> SharedDetector {
        Arc::new(Mutex::new(detector))
    }

    fn detection(confidence: f32) -> Detection {
        Detection {
            bbox: BBox {
                x: 50.0,
                y: 50.0,
                w: 100.0,
                h: 80.0,
            },
            confidence,
            class_id: 0,
            class_name: Some("pothole".to_string()),
        }
    }

    #[test]
    fn process_frame_resizes_and_counts() {
        let detector = shared(StubDetector::with_detections(vec![
            detection(0.9),
            detection(0.7),
        ]));
        let frame = RgbImage::from_pixel(1280, 720, Rgb([90, 90, 90]));

        let payload = process_frame(&frame, &detector, 0.5).unwrap();
        assert_eq!(payload.pothole_count, 2);

        let jpeg = base64::decode(&payload.image).unwrap();
        let decoded =
            image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (FRAME_WIDTH, FRAME_HEIGHT));
    }

    #[test]
    fn low_confidence_detections_are_dropped() {
        let detector = shared(StubDetector::with_detections(vec![
            detection(0.9),
            detection(0.2),
        ]));
        let frame = RgbImage::new(320, 180);

        let payload = process_frame(&frame, &detector, 0.5).unwrap();
        assert_eq!(payload.pothole_count, 1);
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>> {
            Err(anyhow!("inference exploded"))
        }
    }

    #[test]
    fn detector_errors_spoil_only_the_frame() {
        let detector = shared(FailingDetector);
        let frame = RgbImage::new(64, 64);
        assert!(process_frame(&frame, &detector, 0.5).is_err());
    }
}
