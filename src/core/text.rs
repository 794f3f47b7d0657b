use crate::core::video::frame::Frame;

/// 文字识别协作者。OCR 是可选能力：没有识别器时用 NoopTextRecognizer，
/// 所有帧的文字量恒为 0，文字比较自然退化为空操作。
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, frame: &Frame) -> String;
}

/// 无 OCR 配置下的空实现
pub struct NoopTextRecognizer;

impl TextRecognizer for NoopTextRecognizer {
    fn recognize(&self, _frame: &Frame) -> String {
        String::new()
    }
}

pub struct MockTextRecognizer {
    // 按帧编号返回模拟文本
    text_pattern: Option<Box<dyn Fn(u64) -> String + Send + Sync>>,
}

impl MockTextRecognizer {
    pub fn new() -> Self {
        Self { text_pattern: None }
    }

    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(u64) -> String + Send + Sync + 'static,
    {
        Self {
            text_pattern: Some(Box::new(pattern)),
        }
    }

    pub fn with_fixed_frames(frames: Vec<(u64, &'static str)>) -> Self {
        Self {
            text_pattern: Some(Box::new(move |frame_num| {
                frames
                    .iter()
                    .find(|(n, _)| *n == frame_num)
                    .map(|(_, text)| (*text).to_string())
                    .unwrap_or_default()
            })),
        }
    }
}

impl Default for MockTextRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for MockTextRecognizer {
    fn recognize(&self, frame: &Frame) -> String {
        self.text_pattern
            .as_ref()
            .map(|p| p(frame.frame_number))
            .unwrap_or_default()
    }
}
