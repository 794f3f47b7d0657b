//! 视频转讲义处理器

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::Serialize;

use crate::core::config::SamplerConfig;
use crate::core::document::assembler::assemble;
use crate::core::document::pdf::DocumentWriter;
use crate::core::error::PipelineError;
use crate::core::slide::fallback::uniform_capture;
use crate::core::slide::sampler::{ProcessingStats, SlideSampler};
use crate::core::text::TextRecognizer;
use crate::core::video::source::VideoSource;

/// 单张幻灯片的产出记录
#[derive(Debug, Clone, Serialize)]
pub struct SlideInfo {
    pub file: PathBuf,
    pub time_secs: f64,
    pub sharpness: f64,
    pub edge_density: f64,
    pub text_amount: usize,
}

/// 一次完整处理的产出
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub document_path: PathBuf,
    pub slides: Vec<SlideInfo>,
    pub stats: ProcessingStats,
}

impl ProcessReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// 视频转讲义处理器 - 采样、保底、组装
///
/// 处理失败后 `stats()` 仍然可读：组装阶段出错时，
/// 调用方拿到错误的同时还能读到已完成部分的统计。
pub struct SlideProcessor {
    config: SamplerConfig,
    stats: ProcessingStats,
}

impl SlideProcessor {
    pub fn new() -> Self {
        Self::with_config(SamplerConfig::default())
    }

    pub fn with_config(config: SamplerConfig) -> Self {
        Self {
            config,
            stats: ProcessingStats::default(),
        }
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// 完整管线：主采样 → 产出不足则保底采样（整体取代）→ 组装文档。
    /// 幻灯片落在 `<output_dir>/<content_name>_slides/`，
    /// 文档落在 `<output_dir>/<content_name>_notes.pdf`。
    pub fn process(
        &mut self,
        source: &mut dyn VideoSource,
        recognizer: &dyn TextRecognizer,
        writer: &dyn DocumentWriter,
        output_dir: &Path,
        content_name: &str,
    ) -> Result<ProcessReport, PipelineError> {
        self.config.validate()?;
        let started = Instant::now();
        self.stats = ProcessingStats::default();

        info!("🚀 Processing '{}'", content_name);

        let slides_dir = output_dir.join(format!("{}_slides", content_name));
        let mut sampler = SlideSampler::new(self.config.clone(), slides_dir.clone());
        sampler.scan(source, recognizer)?;
        let (mut slides, mut stats) = sampler.into_parts();

        if slides.len() < self.config.fallback_min_slides {
            info!(
                "🔄 Primary pass produced {} slides, switching to fallback capture",
                slides.len()
            );
            slides = uniform_capture(
                source,
                recognizer,
                &slides_dir,
                self.config.fallback_min_slides,
            )?;
            stats.fallback_used = true;
            stats.key_frames = slides.len() as u64;
        }
        // 组装之前统计就已就位，失败时调用方依旧能读
        self.stats = stats;

        let document_path = output_dir.join(format!("{}_notes.pdf", content_name));
        let document_path = assemble(&slides, writer, &document_path)?;

        let report = ProcessReport {
            document_path,
            slides: slides
                .iter()
                .map(|s| SlideInfo {
                    file: s.path.clone(),
                    time_secs: s.timestamp.as_secs_f64(),
                    sharpness: s.metrics.sharpness,
                    edge_density: s.metrics.edge_density,
                    text_amount: s.metrics.text_amount,
                })
                .collect(),
            stats: self.stats.clone(),
        };

        info!(
            "⏱️ Total processing time: {:.1}s",
            started.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// 直接处理视频文件（feature = "ffmpeg"）
    #[cfg(feature = "ffmpeg")]
    pub fn process_file(
        &mut self,
        video_path: &Path,
        recognizer: &dyn TextRecognizer,
        writer: &dyn DocumentWriter,
        output_dir: &Path,
        content_name: &str,
    ) -> Result<ProcessReport, PipelineError> {
        let mut source = crate::core::video::ffmpeg::FfmpegSource::open(video_path)?;
        self.process(&mut source, recognizer, writer, output_dir, content_name)
    }
}

impl Default for SlideProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::pdf::PdfWriter;
    use crate::core::error::AssemblyError;
    use crate::core::text::NoopTextRecognizer;
    use crate::core::video::frame::Frame;
    use crate::core::video::source::FrameSequenceSource;

    fn color_striped_frame(color: [u8; 3], frame_number: u64) -> Frame {
        let mut data = Vec::with_capacity(64 * 64 * 4);
        for _y in 0..64u32 {
            for x in 0..64u32 {
                if (x / 4) % 2 == 0 {
                    data.extend_from_slice(&[color[0], color[1], color[2], 255]);
                } else {
                    data.extend_from_slice(&[0, 0, 0, 255]);
                }
            }
        }
        Frame::new(64, 64, data, frame_number * 1000, frame_number)
    }

    fn uniform_frame(fill: u8, frame_number: u64) -> Frame {
        Frame::new(64, 64, vec![fill; 64 * 64 * 4], frame_number * 1000, frame_number)
    }

    fn two_section_source() -> FrameSequenceSource {
        let mut frames = Vec::new();
        for i in 0..30 {
            frames.push(color_striped_frame([255, 0, 0], i));
        }
        for i in 30..60 {
            frames.push(color_striped_frame([0, 0, 255], i));
        }
        FrameSequenceSource::new(frames, 1.0)
    }

    #[test]
    fn test_end_to_end_produces_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = two_section_source();
        let mut processor = SlideProcessor::new();

        let report = processor
            .process(
                &mut source,
                &NoopTextRecognizer,
                &PdfWriter::new(),
                dir.path(),
                "lecture01",
            )
            .unwrap();

        assert_eq!(report.slides.len(), 2);
        assert!(report.document_path.ends_with("lecture01_notes.pdf"));
        assert!(report.slides[0].file.starts_with(dir.path().join("lecture01_slides")));
        assert!(!report.stats.fallback_used);
        assert_eq!(report.stats.new_slides, 2);
        assert_eq!(report.stats.key_frames, 2);

        let bytes = std::fs::read(&report.document_path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_blurry_video_falls_back_to_uniform_capture() {
        // 全程模糊：主采样 0 张 → 保底采样出恰好 fallback_min_slides 张
        let dir = tempfile::tempdir().unwrap();
        let frames: Vec<Frame> = (0..20).map(|i| uniform_frame(90, i)).collect();
        let mut source = FrameSequenceSource::new(frames, 1.0);
        let mut processor = SlideProcessor::new();

        let report = processor
            .process(
                &mut source,
                &NoopTextRecognizer,
                &PdfWriter::new(),
                dir.path(),
                "blurry",
            )
            .unwrap();

        assert!(report.stats.fallback_used);
        assert_eq!(report.slides.len(), 3);
        assert_eq!(report.stats.key_frames, 3);
        assert_eq!(report.stats.new_slides, 0);
    }

    #[test]
    fn test_empty_source_surfaces_assembly_error_with_stats() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FrameSequenceSource::new(Vec::new(), 1.0);
        let mut processor = SlideProcessor::new();

        let err = processor
            .process(
                &mut source,
                &NoopTextRecognizer,
                &PdfWriter::new(),
                dir.path(),
                "empty",
            )
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Assembly(AssemblyError::NoSlides)
        ));
        // 失败后统计仍然可读
        assert!(processor.stats().fallback_used);
        assert_eq!(processor.stats().total_frames, 0);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = two_section_source();
        let mut processor = SlideProcessor::with_config(SamplerConfig {
            similarity_threshold: 2.0,
            ..Default::default()
        });

        let err = processor
            .process(
                &mut source,
                &NoopTextRecognizer,
                &PdfWriter::new(),
                dir.path(),
                "bad",
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut processor = SlideProcessor::new();

        let mut source = two_section_source();
        let first = processor
            .process(&mut source, &NoopTextRecognizer, &PdfWriter::new(), dir.path(), "rerun")
            .unwrap();

        let mut source = two_section_source();
        let second = processor
            .process(&mut source, &NoopTextRecognizer, &PdfWriter::new(), dir.path(), "rerun")
            .unwrap();

        assert_eq!(first.slides.len(), second.slides.len());
        for (a, b) in first.slides.iter().zip(second.slides.iter()) {
            assert_eq!(a.file, b.file);
            assert_eq!(a.sharpness, b.sharpness);
            assert_eq!(a.text_amount, b.text_amount);
        }
    }

    #[test]
    fn test_report_serializes_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = two_section_source();
        let mut processor = SlideProcessor::new();

        let report = processor
            .process(
                &mut source,
                &NoopTextRecognizer,
                &PdfWriter::new(),
                dir.path(),
                "json",
            )
            .unwrap();

        let json = report.to_json().unwrap();
        assert!(json.contains("\"key_frames\": 2"));
        assert!(json.contains("json_notes.pdf"));
    }
}
