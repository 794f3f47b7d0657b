use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use rayon::prelude::*;

use crate::core::error::PipelineError;
use crate::core::slide::metrics::{compute_metrics, FrameMetrics};
use crate::core::slide::sampler::{AcceptedSlide, DEFAULT_FRAME_RATE};
use crate::core::text::TextRecognizer;
use crate::core::video::frame::Frame;
use crate::core::video::source::VideoSource;

/// 保底采样：主采样产出过少时，按均匀位置截取 N 帧。
/// 不做任何清晰度/相似度过滤，保证退化输入（静止、全程模糊）也有产出。
/// 返回结果整体取代主采样产出，而非合并。
pub fn uniform_capture(
    source: &mut dyn VideoSource,
    recognizer: &dyn TextRecognizer,
    output_dir: &Path,
    count: usize,
) -> Result<Vec<AcceptedSlide>, PipelineError> {
    std::fs::create_dir_all(output_dir)?;

    let total = source.frame_count();
    let n = (count as u64).min(total);
    if n == 0 {
        return Ok(Vec::new());
    }

    let reported = source.frame_rate();
    let fps = if reported > 0.0 {
        reported
    } else {
        DEFAULT_FRAME_RATE
    };

    info!("🔄 Fallback capture: {} uniformly spaced frames", n);

    // 解码必须顺序进行（共享同一个源句柄）
    let mut decoded: Vec<Frame> = Vec::new();
    for i in 0..n {
        let index = i * total / n;
        match source.decode_frame_at(index) {
            Ok(frame) => decoded.push(frame),
            Err(e) => warn!("⚠️ Fallback skipping frame {}: {}", index, e),
        }
    }

    // 帧之间相互独立，指标可以并行算
    let metrics: Vec<Option<FrameMetrics>> = decoded
        .par_iter()
        .map(|frame| compute_metrics(frame, recognizer).ok())
        .collect();

    let mut slides = Vec::new();
    for (frame, metrics) in decoded.iter().zip(metrics) {
        let metrics = match metrics {
            Some(m) => m,
            None => continue,
        };
        let path = output_dir.join(format!("slide_fb_{:03}.png", slides.len() + 1));
        frame
            .save_png(&path)
            .map_err(|e| PipelineError::Persist(e.to_string()))?;
        slides.push(AcceptedSlide {
            path,
            timestamp: Duration::from_secs_f64(frame.frame_number as f64 / fps),
            metrics,
        });
    }

    info!("📸 Fallback captured {} slides", slides.len());
    Ok(slides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::text::NoopTextRecognizer;
    use crate::core::video::source::FrameSequenceSource;

    fn uniform_frame(fill: u8, frame_number: u64) -> Frame {
        Frame::new(32, 32, vec![fill; 32 * 32 * 4], frame_number * 1000, frame_number)
    }

    #[test]
    fn test_fallback_captures_blurry_frames() {
        // 全程模糊的视频：主采样一张都不会收，保底采样必须照收
        let dir = tempfile::tempdir().unwrap();
        let frames: Vec<Frame> = (0..20).map(|i| uniform_frame(100, i)).collect();
        let mut source = FrameSequenceSource::new(frames, 1.0);

        let slides =
            uniform_capture(&mut source, &NoopTextRecognizer, dir.path(), 3).unwrap();

        assert_eq!(slides.len(), 3);
        assert!(slides[0].path.ends_with("slide_fb_001.png"));
        assert!(slides[2].path.ends_with("slide_fb_003.png"));
        // 位置均匀：20 帧取 3 张 → 0, 6, 13
        assert_eq!(slides[0].timestamp, Duration::from_secs(0));
        assert_eq!(slides[1].timestamp, Duration::from_secs(6));
        assert_eq!(slides[2].timestamp, Duration::from_secs(13));
    }

    #[test]
    fn test_fallback_clamped_to_frame_count() {
        let dir = tempfile::tempdir().unwrap();
        let frames: Vec<Frame> = (0..2).map(|i| uniform_frame(50, i)).collect();
        let mut source = FrameSequenceSource::new(frames, 1.0);

        let slides =
            uniform_capture(&mut source, &NoopTextRecognizer, dir.path(), 5).unwrap();
        assert_eq!(slides.len(), 2);
    }

    #[test]
    fn test_fallback_on_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FrameSequenceSource::new(Vec::new(), 1.0);

        let slides =
            uniform_capture(&mut source, &NoopTextRecognizer, dir.path(), 3).unwrap();
        assert!(slides.is_empty());
    }

    #[test]
    fn test_fallback_skips_undecodable_frames() {
        let dir = tempfile::tempdir().unwrap();
        let frames: Vec<Frame> = (0..20).map(|i| uniform_frame(100, i)).collect();
        let mut source = FrameSequenceSource::new(frames, 1.0).with_failing_frames(vec![6]);

        let slides =
            uniform_capture(&mut source, &NoopTextRecognizer, dir.path(), 3).unwrap();
        assert_eq!(slides.len(), 2);
    }
}
