use std::path::{Path, PathBuf};

use log::info;

use crate::core::document::pdf::DocumentWriter;
use crate::core::error::AssemblyError;
use crate::core::slide::sampler::AcceptedSlide;

/// 把已接收的幻灯片组装成最终讲义文档。
/// 文件名带零填充序号，字典序排序即采集顺序，不依赖文件系统列举顺序。
pub fn assemble(
    slides: &[AcceptedSlide],
    writer: &dyn DocumentWriter,
    output: &Path,
) -> Result<PathBuf, AssemblyError> {
    if slides.is_empty() {
        return Err(AssemblyError::NoSlides);
    }

    let mut paths: Vec<PathBuf> = slides.iter().map(|s| s.path.clone()).collect();
    paths.sort();

    info!("📚 Assembling {} slides into {}", paths.len(), output.display());
    writer.write_document(&paths, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slide::metrics::FrameMetrics;
    use std::sync::Mutex;
    use std::time::Duration;

    fn slide(path: &str) -> AcceptedSlide {
        AcceptedSlide {
            path: PathBuf::from(path),
            timestamp: Duration::from_secs(0),
            metrics: FrameMetrics {
                sharpness: 100.0,
                edge_density: 0.1,
                text_amount: 0,
                fingerprint: vec![1.0],
            },
        }
    }

    struct RecordingWriter {
        received: Mutex<Vec<PathBuf>>,
    }

    impl DocumentWriter for RecordingWriter {
        fn write_document(
            &self,
            image_paths: &[PathBuf],
            output: &Path,
        ) -> Result<PathBuf, AssemblyError> {
            *self.received.lock().unwrap() = image_paths.to_vec();
            Ok(output.to_path_buf())
        }
    }

    #[test]
    fn test_empty_collection_is_an_error() {
        let writer = RecordingWriter {
            received: Mutex::new(Vec::new()),
        };
        let err = assemble(&[], &writer, Path::new("out.pdf")).unwrap_err();
        assert!(matches!(err, AssemblyError::NoSlides));
    }

    #[test]
    fn test_slides_ordered_lexicographically() {
        let writer = RecordingWriter {
            received: Mutex::new(Vec::new()),
        };
        let slides = vec![
            slide("slides/slide_003.png"),
            slide("slides/slide_001.png"),
            slide("slides/slide_002.png"),
        ];

        assemble(&slides, &writer, Path::new("out.pdf")).unwrap();

        let received = writer.received.lock().unwrap();
        assert_eq!(
            *received,
            vec![
                PathBuf::from("slides/slide_001.png"),
                PathBuf::from("slides/slide_002.png"),
                PathBuf::from("slides/slide_003.png"),
            ]
        );
    }
}
