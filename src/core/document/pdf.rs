use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::{debug, info};
use printpdf::image_crate::{DynamicImage, GenericImageView};
use printpdf::{Image, ImageTransform, Mm, PdfDocument, Px};
use rayon::prelude::*;

use crate::core::error::AssemblyError;

/// 文档输出协作者 - 组装器只依赖这个接口
pub trait DocumentWriter: Send + Sync {
    fn write_document(
        &self,
        image_paths: &[PathBuf],
        output: &Path,
    ) -> Result<PathBuf, AssemblyError>;
}

/// PDF 输出：一页一张幻灯片，页面尺寸取图片原始分辨率，保持纵横比
pub struct PdfWriter {
    dpi: f64,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self { dpi: 150.0 }
    }

    pub fn with_dpi(dpi: f64) -> Self {
        Self { dpi }
    }

    fn page_dims(&self, img: &DynamicImage) -> (Mm, Mm) {
        let (width, height) = img.dimensions();
        (
            Mm::from(Px(width as usize).into_pt(self.dpi as f32)),
            Mm::from(Px(height as usize).into_pt(self.dpi as f32)),
        )
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentWriter for PdfWriter {
    fn write_document(
        &self,
        image_paths: &[PathBuf],
        output: &Path,
    ) -> Result<PathBuf, AssemblyError> {
        if image_paths.is_empty() {
            return Err(AssemblyError::NoSlides);
        }

        // 图片相互独立，并行解码；任意一张读不出来都是组装错误
        let images: Vec<DynamicImage> = image_paths
            .par_iter()
            .map(|path| {
                printpdf::image_crate::open(path).map_err(|e| AssemblyError::UnreadableImage {
                    path: path.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;

        let title = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "slides".to_string());

        let (first_w, first_h) = self.page_dims(&images[0]);
        let (doc, mut page, mut layer) = PdfDocument::new(title, first_w, first_h, "slide");

        for (i, img) in images.iter().enumerate() {
            if i > 0 {
                let (w, h) = self.page_dims(img);
                let (next_page, next_layer) = doc.add_page(w, h, "slide");
                page = next_page;
                layer = next_layer;
            }

            debug!("Embedding page {} ({}x{})", i + 1, img.width(), img.height());

            // PDF 图像不带 alpha，统一转 RGB 嵌入
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let embedded = Image::from_dynamic_image(&rgb);
            embedded.add_to_layer(
                doc.get_page(page).get_layer(layer),
                ImageTransform {
                    dpi: Some(self.dpi as f32),
                    ..Default::default()
                },
            );
        }

        let file = File::create(output)?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| AssemblyError::WriteFailed(e.to_string()))?;

        info!("✅ Document created: {}", output.display());
        Ok(output.to_path_buf())
    }
}
