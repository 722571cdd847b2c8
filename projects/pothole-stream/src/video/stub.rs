use anyhow::{anyhow, Result};
use image::RgbImage;

use super::FrameSource;

/// In-memory frame source for testing. Plays a fixed list of frames and
/// errors at the end like a real decoder, so callers exercise the rewind
/// path.
pub struct StubSource {
    frames: Vec<RgbImage>,
    cursor: usize,
}

impl StubSource {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl FrameSource for StubSource {
    fn next_frame(&mut self) -> Result<RgbImage> {
        match self.frames.get(self.cursor) {
            Some(frame) => {
                self.cursor += 1;
                Ok(frame.clone())
            }
            None => Err(anyhow!("end of stream")),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn stub_source_plays_frames_then_rewinds() {
        let frames = vec![
            RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])),
            RgbImage::from_pixel(4, 4, Rgb([0, 255, 0])),
        ];
        let mut source = StubSource::new(frames);

        assert_eq!(source.next_frame().unwrap().get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(source.next_frame().unwrap().get_pixel(0, 0).0, [0, 255, 0]);
        assert!(source.next_frame().is_err());

        source.rewind().unwrap();
        assert_eq!(source.next_frame().unwrap().get_pixel(0, 0).0, [255, 0, 0]);
    }
}
