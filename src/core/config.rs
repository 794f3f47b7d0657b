use serde::{Deserialize, Serialize};

use crate::core::error::PipelineError;

/// 采样配置 - 控制帧的去留与替换
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// 采样间隔（秒）
    pub capture_interval_seconds: f64,
    /// 指纹相关度高于该值视为同一张幻灯片
    pub similarity_threshold: f64,
    /// 替换所需的清晰度倍数
    pub replace_sharpness_factor: f64,
    /// 替换所需的额外文字字符数
    pub replace_text_extra: usize,
    /// 低于该清晰度的帧直接丢弃
    pub min_sharpness: f64,
    /// 主采样产出低于该数量时触发保底采样
    pub fallback_min_slides: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            capture_interval_seconds: 5.0,
            similarity_threshold: 0.90,
            replace_sharpness_factor: 1.10,
            replace_text_extra: 10,
            min_sharpness: 50.0,
            fallback_min_slides: 3,
        }
    }
}

impl SamplerConfig {
    /// 切换频繁的讲座（快节奏翻页）
    pub fn for_fast_paced() -> Self {
        Self {
            capture_interval_seconds: 2.0,
            similarity_threshold: 0.85,
            ..Default::default()
        }
    }

    /// 固定机位、幻灯片久置不动的讲座
    pub fn for_still_camera() -> Self {
        Self {
            capture_interval_seconds: 8.0,
            similarity_threshold: 0.95,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.capture_interval_seconds > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "capture_interval_seconds must be positive, got {}",
                self.capture_interval_seconds
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(PipelineError::InvalidConfig(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.replace_sharpness_factor < 1.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "replace_sharpness_factor must be >= 1, got {}",
                self.replace_sharpness_factor
            )));
        }
        if self.min_sharpness < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "min_sharpness must be >= 0, got {}",
                self.min_sharpness
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SamplerConfig::default().validate().is_ok());
        assert!(SamplerConfig::for_fast_paced().validate().is_ok());
        assert!(SamplerConfig::for_still_camera().validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let config = SamplerConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let config = SamplerConfig {
            capture_interval_seconds: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sharpness_factor_below_one_rejected() {
        let config = SamplerConfig {
            replace_sharpness_factor: 0.9,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
