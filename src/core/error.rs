use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("video source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("decode failed at frame {index}: {reason}")]
    DecodeFailure { index: u64, reason: String },
    #[error("invalid frame {index}: {reason}")]
    InvalidFrame { index: u64, reason: String },
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("fingerprint length mismatch: {left} vs {right}")]
    FingerprintMismatch { left: usize, right: usize },
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("no slides to assemble")]
    NoSlides,
    #[error("unreadable slide image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },
    #[error("document write failed: {0}")]
    WriteFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("slide persist failed: {0}")]
    Persist(String),
    #[error(transparent)]
    Video(#[from] VideoError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
