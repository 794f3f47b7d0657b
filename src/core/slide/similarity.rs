use crate::core::config::SamplerConfig;
use crate::core::error::MetricsError;
use crate::core::slide::metrics::FrameMetrics;

/// 指纹相关度，OpenCV HISTCMP_CORREL 同式（皮尔逊相关系数）。
/// 1 = 分布一致，0 = 不相关，强负相关时可为负值。
/// 两个指纹长度不一致时比较无定义，显式报错。
pub fn correlation(a: &[f32], b: &[f32]) -> Result<f64, MetricsError> {
    if a.len() != b.len() || a.is_empty() {
        return Err(MetricsError::FingerprintMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let n = a.len() as f64;
    let mean_a = a.iter().map(|&v| v as f64).sum::<f64>() / n;
    let mean_b = b.iter().map(|&v| v as f64).sum::<f64>() / n;

    let mut cov = 0.0f64;
    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    // 零方差（完全平坦）的归一化直方图：两边都平坦则分布相同
    if var_a == 0.0 || var_b == 0.0 {
        return Ok(if var_a == var_b { 1.0 } else { 0.0 });
    }

    Ok(cov / (var_a * var_b).sqrt())
}

/// 候选帧是否值得替换现任帧：清晰度倍增或文字量增加，满足其一即可。
/// 边缘密度只作参考信号，不触发替换。
pub fn is_better(candidate: &FrameMetrics, incumbent: &FrameMetrics, config: &SamplerConfig) -> bool {
    if candidate.sharpness >= incumbent.sharpness * config.replace_sharpness_factor {
        return true;
    }
    candidate.text_amount >= incumbent.text_amount + config.replace_text_extra
}
