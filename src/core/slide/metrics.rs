use crate::core::error::VideoError;
use crate::core::text::TextRecognizer;
use crate::core::video::frame::Frame;

/// HSV 指纹分桶：16 色相 x 4 饱和度 x 4 明度
pub const HUE_BINS: usize = 16;
pub const SAT_BINS: usize = 4;
pub const VAL_BINS: usize = 4;
pub const FINGERPRINT_LEN: usize = HUE_BINS * SAT_BINS * VAL_BINS;

// 梯度幅值超过该值（0-255 亮度尺度）记为边缘像素
const EDGE_GRADIENT_THRESHOLD: i32 = 40;

/// 单帧质量指标，计算一次后不再变化
#[derive(Debug, Clone)]
pub struct FrameMetrics {
    pub sharpness: f64,
    pub edge_density: f64,
    pub text_amount: usize,
    pub fingerprint: Vec<f32>,
}

/// 计算一帧的全部指标。同一帧重复计算结果逐位一致。
pub fn compute_metrics(
    frame: &Frame,
    recognizer: &dyn TextRecognizer,
) -> Result<FrameMetrics, VideoError> {
    frame.validate()?;

    let gray = frame.to_gray();
    let sharpness = laplacian_variance(&gray, frame.width, frame.height);
    let edge_density = edge_density(&gray, frame.width, frame.height);

    let text = recognizer.recognize(frame);
    let text_amount = text.chars().filter(|c| !c.is_whitespace()).count();

    Ok(FrameMetrics {
        sharpness,
        edge_density,
        text_amount,
        fingerprint: hsv_fingerprint(frame),
    })
}

/// 清晰度 = 3x3 拉普拉斯响应的方差，越大越清晰
fn laplacian_variance(gray: &[u8], width: u32, height: u32) -> f64 {
    let w = width as usize;
    let h = height as usize;
    if w < 3 || h < 3 {
        return 0.0;
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for y in 1..(h - 1) {
        let row = y * w;
        for x in 1..(w - 1) {
            let idx = row + x;
            let lap = gray[idx - 1] as i32
                + gray[idx + 1] as i32
                + gray[idx - w] as i32
                + gray[idx + w] as i32
                - 4 * gray[idx] as i32;
            let v = lap as f64;
            sum += v;
            sum_sq += v * v;
            count += 1;
        }
    }

    let n = count as f64;
    let mean = sum / n;
    sum_sq / n - mean * mean
}

/// 边缘密度 = 梯度幅值过阈值的像素占比
/// Integer math, squared compare to avoid sqrt per pixel
fn edge_density(gray: &[u8], width: u32, height: u32) -> f64 {
    let w = width as usize;
    let h = height as usize;
    if w < 3 || h < 3 {
        return 0.0;
    }

    let threshold_sq = EDGE_GRADIENT_THRESHOLD * EDGE_GRADIENT_THRESHOLD;
    let mut edge_count = 0u64;
    let mut total = 0u64;

    for y in 1..(h - 1) {
        let row = y * w;
        for x in 1..(w - 1) {
            let idx = row + x;
            let gx = gray[idx + 1] as i32 - gray[idx - 1] as i32;
            let gy = gray[idx + w] as i32 - gray[idx - w] as i32;
            if gx * gx + gy * gy > threshold_sq {
                edge_count += 1;
            }
            total += 1;
        }
    }

    edge_count as f64 / total as f64
}

/// 颜色指纹：HSV 联合直方图，L1 归一化后与分辨率无关
fn hsv_fingerprint(frame: &Frame) -> Vec<f32> {
    let mut hist = vec![0u32; FINGERPRINT_LEN];

    for chunk in frame.data.chunks_exact(4) {
        let (h, s, v) = rgb_to_hsv(chunk[0], chunk[1], chunk[2]);
        let hi = ((h / 360.0 * HUE_BINS as f32) as usize).min(HUE_BINS - 1);
        let si = ((s * SAT_BINS as f32) as usize).min(SAT_BINS - 1);
        let vi = ((v * VAL_BINS as f32) as usize).min(VAL_BINS - 1);
        hist[(hi * SAT_BINS + si) * VAL_BINS + vi] += 1;
    }

    let total = frame.pixel_count() as f32;
    hist.into_iter().map(|c| c as f32 / total).collect()
}

fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h, s, max)
}
