//! printpdf 画布后端
//!
//! 坐标原点在页面左下角，与排版游标一致；内部换算为毫米。
//! 宽度测量按字符显示宽估算：全角字符一个字号宽，半角半个。

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use tracing::warn;
use unicode_width::UnicodeWidthChar;

use crate::error::{AppError, AppResult, RenderError};
use crate::layout::PageMetrics;
use crate::render::canvas::{Canvas, Ink};
use crate::render::fonts::FontResolution;

const LAYER_NAME: &str = "內容";

fn to_mm(pt: f32) -> Mm {
    Mm((pt * 25.4 / 72.0).into())
}

/// PDF 画布
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    metrics: PageMetrics,
}

impl PdfCanvas {
    pub fn new(title: &str, metrics: PageMetrics, resolution: &FontResolution) -> AppResult<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            to_mm(metrics.width),
            to_mm(metrics.height),
            LAYER_NAME,
        );

        let font = match resolution {
            FontResolution::Embedded { source, data } => match doc.add_external_font(data.as_slice()) {
                Ok(font) => font,
                Err(e) => {
                    warn!("⚠️ 字体注册失败 ({}): {}，退回内建字形集", source, e);
                    builtin_font(&doc)?
                }
            },
            FontResolution::Builtin => builtin_font(&doc)?,
        };

        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            font,
            metrics,
        })
    }

    /// 写出 PDF 字节
    pub fn finish(self) -> AppResult<Vec<u8>> {
        self.doc.save_to_bytes().map_err(|e| {
            AppError::Render(RenderError::PdfWriteFailed {
                source: e.to_string().into(),
            })
        })
    }

    fn ink_color(ink: Ink) -> Color {
        match ink {
            Ink::Body => Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)),
            Ink::Accent => Color::Rgb(Rgb::new(0.8, 0.0, 0.0, None)),
        }
    }
}

fn builtin_font(doc: &PdfDocumentReference) -> AppResult<IndirectFontRef> {
    doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| {
        AppError::Render(RenderError::FontRegisterFailed {
            path: "builtin:Helvetica".to_string(),
            source: e.to_string().into(),
        })
    })
}

impl Canvas for PdfCanvas {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let cells: usize = text
            .chars()
            .map(|c| UnicodeWidthChar::width(c).unwrap_or(1))
            .sum();
        cells as f32 * size * 0.5
    }

    fn draw_text(&mut self, x: f32, y: f32, size: f32, ink: Ink, text: &str) {
        self.layer.set_fill_color(Self::ink_color(ink));
        self.layer
            .use_text(text, size.into(), to_mm(x), to_mm(y), &self.font);
    }

    fn draw_rule(&mut self, x1: f32, x2: f32, y: f32) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer.set_outline_thickness(0.6);
        let line = Line {
            points: vec![
                (Point::new(to_mm(x1), to_mm(y)), false),
                (Point::new(to_mm(x2), to_mm(y)), false),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        };
        self.layer.add_shape(line);
    }

    fn begin_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            to_mm(self.metrics.width),
            to_mm(self.metrics.height),
            LAYER_NAME,
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
    }
}
