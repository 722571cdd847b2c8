use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind to
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Path to the video file to stream
    #[arg(long, env = "POTHOLE_STREAM_VIDEO")]
    pub video: PathBuf,

    /// Path to the pretrained detection model weights
    #[arg(long, env = "POTHOLE_STREAM_MODEL")]
    pub model: PathBuf,

    /// Minimum confidence for a detection to be kept
    #[arg(long, default_value_t = 0.5)]
    pub min_confidence: f32,

    /// Target streaming frame rate
    #[arg(long, default_value_t = 24.0)]
    pub fps: f64,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
