use std::collections::HashSet;

use crate::core::error::VideoError;
use crate::core::video::frame::Frame;

/// 视频源协作者 - 采样控制器只依赖这个接口
pub trait VideoSource {
    fn frame_rate(&self) -> f64;
    fn frame_count(&self) -> u64;
    fn duration_secs(&self) -> f64;
    fn decode_frame_at(&mut self, index: u64) -> Result<Frame, VideoError>;
}

/// 内存帧序列视频源 - 合成视频与测试用
pub struct FrameSequenceSource {
    frames: Vec<Frame>,
    frame_rate: f64,
    failing_frames: HashSet<u64>,
}

impl FrameSequenceSource {
    pub fn new(frames: Vec<Frame>, frame_rate: f64) -> Self {
        Self {
            frames,
            frame_rate,
            failing_frames: HashSet::new(),
        }
    }

    /// 指定若干帧号模拟解码失败
    pub fn with_failing_frames(mut self, indices: Vec<u64>) -> Self {
        self.failing_frames = indices.into_iter().collect();
        self
    }
}

impl VideoSource for FrameSequenceSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn duration_secs(&self) -> f64 {
        if self.frame_rate > 0.0 {
            self.frames.len() as f64 / self.frame_rate
        } else {
            0.0
        }
    }

    fn decode_frame_at(&mut self, index: u64) -> Result<Frame, VideoError> {
        if self.failing_frames.contains(&index) {
            return Err(VideoError::DecodeFailure {
                index,
                reason: "simulated decode failure".to_string(),
            });
        }
        self.frames
            .get(index as usize)
            .cloned()
            .ok_or(VideoError::DecodeFailure {
                index,
                reason: "index past end of stream".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_frame(fill: u8, frame_number: u64) -> Frame {
        Frame::new(16, 16, vec![fill; 16 * 16 * 4], frame_number * 40, frame_number)
    }

    #[test]
    fn test_sequence_source_properties() {
        let frames: Vec<Frame> = (0..50).map(|i| create_test_frame(100, i)).collect();
        let source = FrameSequenceSource::new(frames, 25.0);

        assert_eq!(source.frame_count(), 50);
        assert_eq!(source.frame_rate(), 25.0);
        assert!((source.duration_secs() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_decode_returns_requested_frame() {
        let frames: Vec<Frame> = (0..10).map(|i| create_test_frame(i as u8, i)).collect();
        let mut source = FrameSequenceSource::new(frames, 10.0);

        let frame = source.decode_frame_at(4).unwrap();
        assert_eq!(frame.frame_number, 4);
        assert_eq!(frame.data[0], 4);
    }

    #[test]
    fn test_decode_past_end_fails() {
        let mut source = FrameSequenceSource::new(vec![create_test_frame(0, 0)], 10.0);
        let err = source.decode_frame_at(5).unwrap_err();
        assert!(matches!(err, VideoError::DecodeFailure { index: 5, .. }));
    }

    #[test]
    fn test_injected_decode_failure() {
        let frames: Vec<Frame> = (0..6).map(|i| create_test_frame(10, i)).collect();
        let mut source = FrameSequenceSource::new(frames, 10.0).with_failing_frames(vec![2]);

        assert!(source.decode_frame_at(1).is_ok());
        assert!(source.decode_frame_at(2).is_err());
        assert!(source.decode_frame_at(3).is_ok());
    }
}
