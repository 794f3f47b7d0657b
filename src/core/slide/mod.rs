//! 幻灯片选择管线 - 从采样帧里挑出最小、去重的代表帧集合
//!
//! 核心策略：
//! 1. 清晰度门槛 - 拉普拉斯方差过滤模糊帧
//! 2. 指纹相关度 - HSV 直方图判定是否为新内容
//! 3. 原位替换 - 同一张幻灯片的更好拍摄覆盖末位
//! 4. 保底采样 - 退化输入按均匀位置截取

pub mod fallback;
pub mod metrics;
pub mod sampler;
pub mod similarity;

pub use metrics::{compute_metrics, FrameMetrics, FINGERPRINT_LEN};
pub use sampler::{AcceptedSlide, ProcessingStats, SampleDecision, SlideSampler};
pub use similarity::{correlation, is_better};
