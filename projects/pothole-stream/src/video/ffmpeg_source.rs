use anyhow::{anyhow, Context, Result};
use ffmpeg_next as ffmpeg;
use image::RgbImage;
use std::path::Path;

use super::FrameSource;

/// Video file source backed by FFmpeg. Decodes to RGB24 at source
/// resolution; downstream stages handle resizing.
pub struct FfmpegSource {
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    stream_index: usize,
}

// SAFETY: the source is created inside the worker thread that owns it and
// never shared; the raw pointers inside ffmpeg-next types are not accessed
// from any other thread.
unsafe impl Send for FfmpegSource {}

impl FfmpegSource {
    pub fn open(path: &Path) -> Result<Self> {
        ffmpeg::init().context("initialize ffmpeg")?;

        if !path.exists() {
            return Err(anyhow!("video file not found: {}", path.display()));
        }

        let input = ffmpeg::format::input(&path)
            .with_context(|| format!("failed to open video file {}", path.display()))?;

        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow!("no video stream found in {}", path.display()))?;
        let stream_index = stream.index();

        let rational_fps = stream.avg_frame_rate();
        let source_fps = if rational_fps.denominator() > 0 {
            rational_fps.numerator() as f64 / rational_fps.denominator() as f64
        } else {
            tracing::warn!("FfmpegSource: could not determine FPS, defaulting to 30.0");
            30.0
        };

        let decoder_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .context("create decoder context")?;
        let decoder = decoder_ctx
            .decoder()
            .video()
            .context("open video decoder")?;

        let scaler = ffmpeg::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::Flags::BILINEAR,
        )
        .context("create scaler")?;

        tracing::info!(
            "FfmpegSource: opened {} ({}x{}, {:.2} fps)",
            path.display(),
            decoder.width(),
            decoder.height(),
            source_fps
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
        })
    }
}

impl FrameSource for FfmpegSource {
    fn next_frame(&mut self) -> Result<RgbImage> {
        let mut decoded = ffmpeg::frame::Video::empty();
        let mut rgb = ffmpeg::frame::Video::empty();

        for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index {
                continue;
            }

            self.decoder
                .send_packet(&packet)
                .context("send packet to decoder")?;

            if self.decoder.receive_frame(&mut decoded).is_ok() {
                self.scaler
                    .run(&decoded, &mut rgb)
                    .context("scale frame to RGB")?;
                return frame_to_image(&rgb);
            }
        }

        Err(anyhow!("end of stream"))
    }

    fn rewind(&mut self) -> Result<()> {
        self.input.seek(0, ..0).context("seek to start of video")?;
        self.decoder.flush();
        Ok(())
    }
}

/// Copy a decoded RGB24 frame into an owned image, honoring the row stride.
fn frame_to_image(frame: &ffmpeg::frame::Video) -> Result<RgbImage> {
    let width = frame.width();
    let height = frame.height();
    let row_bytes = width as usize * 3;
    let stride = frame.stride(0);
    let data = frame.data(0);

    let pixels = if stride == row_bytes {
        data[..row_bytes * height as usize].to_vec()
    } else {
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            pixels.extend_from_slice(
                data.get(start..start + row_bytes)
                    .ok_or_else(|| anyhow!("ffmpeg frame row out of bounds"))?,
            );
        }
        pixels
    };

    RgbImage::from_vec(width, height, pixels)
        .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", width, height))
}
