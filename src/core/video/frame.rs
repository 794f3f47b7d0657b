use std::path::Path;
use std::time::Duration;

use crate::core::error::VideoError;

/// 帧数据结构
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA 格式
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Self {
        Self {
            width,
            height,
            data,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// 校验帧元数据，零尺寸或数据长度不符视为坏帧
    pub fn validate(&self) -> Result<(), VideoError> {
        if self.width == 0 || self.height == 0 {
            return Err(VideoError::InvalidFrame {
                index: self.frame_number,
                reason: format!("zero-sized frame {}x{}", self.width, self.height),
            });
        }
        let expected = self.pixel_count() * 4;
        if self.data.len() != expected {
            return Err(VideoError::InvalidFrame {
                index: self.frame_number,
                reason: format!(
                    "data length {} does not match {}x{} RGBA ({} bytes)",
                    self.data.len(),
                    self.width,
                    self.height,
                    expected
                ),
            });
        }
        Ok(())
    }

    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
        for chunk in self.data.chunks_exact(4) {
            rgb.push(chunk[0]); // R
            rgb.push(chunk[1]); // G
            rgb.push(chunk[2]); // B
        }
        rgb
    }

    /// 整数亮度灰度图（0-255）
    pub fn to_gray(&self) -> Vec<u8> {
        self.data
            .chunks_exact(4)
            .map(|rgba| {
                ((rgba[0] as u32 * 299 + rgba[1] as u32 * 587 + rgba[2] as u32 * 114) / 1000) as u8
            })
            .collect()
    }

    /// 以 RGB PNG 形式落盘（丢弃 alpha，便于后续 PDF 嵌入）
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.to_rgb())
            .expect("frame dimensions validated before save");
        img.save_with_format(path, image::ImageFormat::Png)
    }
}
