//! FFmpeg 视频源（feature = "ffmpeg"，依赖系统 FFmpeg 库）

use std::path::Path;

use ffmpeg_next as ffmpeg;
use log::debug;
use once_cell::sync::OnceCell;

use crate::core::error::VideoError;
use crate::core::video::frame::Frame;
use crate::core::video::source::VideoSource;

/// FFmpeg 全局初始化只允许一次
fn init_ffmpeg() -> Result<(), VideoError> {
    static INIT: OnceCell<Result<(), String>> = OnceCell::new();
    INIT.get_or_init(|| ffmpeg::init().map_err(|e| e.to_string()))
        .clone()
        .map_err(VideoError::SourceUnavailable)
}

pub struct FfmpegSource {
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: ffmpeg::software::scaling::context::Context,
    stream_index: usize,
    time_base: f64,
    frame_rate: f64,
    frame_count: u64,
    duration_secs: f64,
}

impl FfmpegSource {
    /// 打开视频文件。源打不开是致命错误，在任何采样开始前失败。
    pub fn open(path: &Path) -> Result<Self, VideoError> {
        init_ffmpeg()?;

        let input = ffmpeg::format::input(&path)
            .map_err(|e| VideoError::SourceUnavailable(format!("{}: {}", path.display(), e)))?;

        let duration_secs = if input.duration() >= 0 {
            input.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE)
        } else {
            0.0
        };

        let (stream_index, time_base, frame_rate, reported_frames, parameters) = {
            let stream = input
                .streams()
                .best(ffmpeg::media::Type::Video)
                .ok_or_else(|| {
                    VideoError::SourceUnavailable(format!("{}: no video stream", path.display()))
                })?;
            let rate = stream.avg_frame_rate();
            let frame_rate = if rate.denominator() != 0 {
                f64::from(rate)
            } else {
                0.0
            };
            (
                stream.index(),
                f64::from(stream.time_base()),
                frame_rate,
                stream.frames(),
                stream.parameters(),
            )
        };

        // 容器没写帧数时按时长估算
        let frame_count = if reported_frames > 0 {
            reported_frames as u64
        } else {
            (duration_secs * frame_rate).floor() as u64
        };

        let decoder = ffmpeg::codec::context::Context::from_parameters(parameters)
            .map_err(|e| VideoError::SourceUnavailable(e.to_string()))?
            .decoder()
            .video()
            .map_err(|e| VideoError::SourceUnavailable(e.to_string()))?;

        let scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::Pixel::RGBA,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .map_err(|e| VideoError::SourceUnavailable(e.to_string()))?;

        debug!(
            "Opened {}: {:.1}s, {} frames, {:.2} FPS",
            path.display(),
            duration_secs,
            frame_count,
            frame_rate
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            frame_rate,
            frame_count,
            duration_secs,
        })
    }

    fn to_rgba_frame(
        &mut self,
        decoded: &ffmpeg::util::frame::video::Video,
        index: u64,
        time_secs: f64,
    ) -> Result<Frame, VideoError> {
        let mut rgba = ffmpeg::util::frame::video::Video::empty();
        self.scaler
            .run(decoded, &mut rgba)
            .map_err(|e| VideoError::DecodeFailure {
                index,
                reason: e.to_string(),
            })?;

        let width = rgba.width();
        let height = rgba.height();
        let stride = rgba.stride(0);
        let plane = rgba.data(0);

        // 行尾可能有对齐填充，按 stride 逐行拷贝
        let row_bytes = width as usize * 4;
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for y in 0..height as usize {
            let start = y * stride;
            data.extend_from_slice(&plane[start..start + row_bytes]);
        }

        Ok(Frame::new(
            width,
            height,
            data,
            (time_secs * 1000.0) as u64,
            index,
        ))
    }
}

impl VideoSource for FfmpegSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    fn decode_frame_at(&mut self, index: u64) -> Result<Frame, VideoError> {
        let fps = if self.frame_rate > 0.0 {
            self.frame_rate
        } else {
            25.0
        };
        let target_secs = index as f64 / fps;
        let target_ts = if self.time_base > 0.0 {
            (target_secs / self.time_base) as i64
        } else {
            0
        };

        self.input
            .seek(target_ts, ..target_ts)
            .map_err(|e| VideoError::DecodeFailure {
                index,
                reason: format!("seek to {:.2}s failed: {}", target_secs, e),
            })?;
        self.decoder.flush();

        // 从关键帧解码到目标时间戳及之后的第一帧
        let mut decoded = ffmpeg::util::frame::video::Video::empty();
        let mut found_secs = None;
        'demux: for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index {
                continue;
            }
            self.decoder.send_packet(&packet).ok();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let current = decoded.pts().unwrap_or(0) as f64 * self.time_base;
                if current + 1e-9 >= target_secs {
                    found_secs = Some(current);
                    break 'demux;
                }
            }
        }

        match found_secs {
            Some(secs) => self.to_rgba_frame(&decoded, index, secs),
            None => Err(VideoError::DecodeFailure {
                index,
                reason: "no frame at or after target timestamp".to_string(),
            }),
        }
    }
}
