#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod frame;
pub mod source;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegSource;
pub use frame::Frame;
pub use source::{FrameSequenceSource, VideoSource};
