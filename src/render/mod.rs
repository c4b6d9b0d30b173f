pub mod canvas;
pub mod fodt;
pub mod fonts;
pub mod pdf;
pub mod worksheet;

pub use canvas::{Canvas, Ink};
pub use fonts::{resolve_font, FontResolution};
pub use pdf::PdfCanvas;
pub use worksheet::{Variant, WorksheetRenderer};

use crate::error::AppResult;
use crate::models::Question;

/// 渲染一份工作纸并返回 PDF 字节
///
/// 发送层消费此接口：下载落盘或作为邮件附件。
pub fn render_to_bytes(
    school: &str,
    level: &str,
    student: Option<&str>,
    questions: &[Question],
    variant: Variant,
    font: &FontResolution,
) -> AppResult<Vec<u8>> {
    let renderer = WorksheetRenderer::default();
    let title = renderer.title_text(school, level, student, variant);
    let mut canvas = PdfCanvas::new(&title, renderer.metrics, font)?;
    renderer.render(&mut canvas, school, level, student, questions, variant);
    canvas.finish()
}
