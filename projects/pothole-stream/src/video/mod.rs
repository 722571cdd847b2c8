pub mod ffmpeg_source;
pub mod stub;

use anyhow::Result;
use image::RgbImage;
use std::sync::Arc;

/// A restartable sequence of video frames.
pub trait FrameSource: Send {
    /// Decode the next frame. Errors at end of stream; the caller decides
    /// whether to rewind or give up.
    fn next_frame(&mut self) -> Result<RgbImage>;

    /// Seek back to the first frame.
    fn rewind(&mut self) -> Result<()>;
}

/// Constructor for a frame source, invoked inside each session's worker
/// thread so every connection owns an independent video handle.
pub type SourceFactory = Arc<dyn Fn() -> Result<Box<dyn FrameSource>> + Send + Sync>;
