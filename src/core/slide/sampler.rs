use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use crate::core::config::SamplerConfig;
use crate::core::error::{MetricsError, PipelineError};
use crate::core::slide::metrics::{compute_metrics, FrameMetrics};
use crate::core::slide::similarity::{correlation, is_better};
use crate::core::text::TextRecognizer;
use crate::core::video::frame::Frame;
use crate::core::video::source::VideoSource;

/// 源未报告帧率时的兜底值
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

/// 单个采样点的决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDecision {
    Rejected,
    NewSlide,
    Replaced,
    Duplicate,
}

/// 已接收的幻灯片：落盘路径 + 采集时刻 + 指标
#[derive(Debug, Clone)]
pub struct AcceptedSlide {
    pub path: PathBuf,
    pub timestamp: Duration,
    pub metrics: FrameMetrics,
}

/// 处理统计，采样期间只写，结束后供调用方读取
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingStats {
    pub video_duration_secs: f64,
    pub total_frames: u64,
    pub sampled_frames: u64,
    pub decode_failures: u64,
    pub rejected_frames: u64,
    pub new_slides: u64,
    pub replaced_slides: u64,
    pub duplicate_frames: u64,
    pub key_frames: u64,
    pub fallback_used: bool,
}

/// 采样控制器 - 按固定时间间隔走完视频，决定每帧的去留。
/// 最近接收的幻灯片是唯一的比较锚点，替换只覆盖末位。
pub struct SlideSampler {
    config: SamplerConfig,
    output_dir: PathBuf,
    slides: Vec<AcceptedSlide>,
    stats: ProcessingStats,
}

impl SlideSampler {
    pub fn new(config: SamplerConfig, output_dir: PathBuf) -> Self {
        Self {
            config,
            output_dir,
            slides: Vec::new(),
            stats: ProcessingStats::default(),
        }
    }

    pub fn slides(&self) -> &[AcceptedSlide] {
        &self.slides
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn into_parts(self) -> (Vec<AcceptedSlide>, ProcessingStats) {
        (self.slides, self.stats)
    }

    /// 主采样循环。逐采样点解码、计算指标、决策并立即落盘。
    /// 单帧解码失败或坏帧只跳过该采样点，不中断扫描。
    pub fn scan(
        &mut self,
        source: &mut dyn VideoSource,
        recognizer: &dyn TextRecognizer,
    ) -> Result<(), PipelineError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let reported = source.frame_rate();
        let fps = if reported > 0.0 {
            reported
        } else {
            DEFAULT_FRAME_RATE
        };
        let total = source.frame_count();
        self.stats.total_frames = total;
        self.stats.video_duration_secs = source.duration_secs();

        info!(
            "🎬 Video info: {:.1}s, {} frames, {:.1} FPS",
            self.stats.video_duration_secs, total, fps
        );

        let stride = (self.config.capture_interval_seconds * fps).round().max(1.0) as u64;

        let mut index = 0u64;
        while index < total {
            match source.decode_frame_at(index) {
                Ok(frame) => self.process_sample(frame, fps, recognizer)?,
                Err(e) => {
                    warn!("⚠️ Skipping sample at frame {}: {}", index, e);
                    self.stats.decode_failures += 1;
                }
            }
            index += stride;
        }

        self.stats.key_frames = self.slides.len() as u64;
        Ok(())
    }

    /// 单个采样点的决策：先看清晰度，再看与锚点的指纹相关度，
    /// 相似时才考虑替换。
    pub fn decide(&self, metrics: &FrameMetrics) -> Result<SampleDecision, MetricsError> {
        if metrics.sharpness < self.config.min_sharpness {
            return Ok(SampleDecision::Rejected);
        }

        let incumbent = match self.slides.last() {
            None => return Ok(SampleDecision::NewSlide),
            Some(slide) => slide,
        };

        // 强负相关按 0 处理
        let corr = correlation(&metrics.fingerprint, &incumbent.metrics.fingerprint)?.max(0.0);
        if corr < self.config.similarity_threshold {
            return Ok(SampleDecision::NewSlide);
        }

        if is_better(metrics, &incumbent.metrics, &self.config) {
            Ok(SampleDecision::Replaced)
        } else {
            Ok(SampleDecision::Duplicate)
        }
    }

    fn process_sample(
        &mut self,
        frame: Frame,
        fps: f64,
        recognizer: &dyn TextRecognizer,
    ) -> Result<(), PipelineError> {
        self.stats.sampled_frames += 1;

        let metrics = match compute_metrics(&frame, recognizer) {
            Ok(m) => m,
            Err(e) => {
                // 坏帧按解码失败处理
                warn!("⚠️ Skipping invalid frame {}: {}", frame.frame_number, e);
                self.stats.decode_failures += 1;
                return Ok(());
            }
        };

        let time_secs = frame.frame_number as f64 / fps;
        match self.decide(&metrics)? {
            SampleDecision::Rejected => {
                self.stats.rejected_frames += 1;
                debug!(
                    "Rejected blurry frame at {:.1}s (sharpness {:.1})",
                    time_secs, metrics.sharpness
                );
            }
            SampleDecision::NewSlide => self.accept_new(&frame, metrics, time_secs)?,
            SampleDecision::Replaced => self.replace_last(&frame, metrics, time_secs),
            SampleDecision::Duplicate => {
                self.stats.duplicate_frames += 1;
                debug!("Duplicate frame at {:.1}s", time_secs);
            }
        }
        Ok(())
    }

    fn accept_new(
        &mut self,
        frame: &Frame,
        metrics: FrameMetrics,
        time_secs: f64,
    ) -> Result<(), PipelineError> {
        let slide_no = self.slides.len() + 1;
        let path = self.output_dir.join(format!("slide_{:03}.png", slide_no));
        frame
            .save_png(&path)
            .map_err(|e| PipelineError::Persist(e.to_string()))?;

        info!("📸 Saved slide {} at {:.1}s", slide_no, time_secs);
        self.slides.push(AcceptedSlide {
            path,
            timestamp: Duration::from_secs_f64(time_secs),
            metrics,
        });
        self.stats.new_slides += 1;
        Ok(())
    }

    /// 就地替换末位幻灯片：覆盖同一文件，序列长度不变。
    /// 覆盖失败只告警，保留现任帧。
    fn replace_last(&mut self, frame: &Frame, metrics: FrameMetrics, time_secs: f64) {
        let slide_no = self.slides.len();
        let slot = self
            .slides
            .last_mut()
            .expect("replace decision requires an incumbent");

        match frame.save_png(&slot.path) {
            Ok(()) => {
                slot.timestamp = Duration::from_secs_f64(time_secs);
                slot.metrics = metrics;
                self.stats.replaced_slides += 1;
                info!("🔁 Replaced slide {} with better frame at {:.1}s", slide_no, time_secs);
            }
            Err(e) => warn!("⚠️ Replacement failed: {}", e),
        }
    }
}
