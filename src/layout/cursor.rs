//! 版面尺寸与纵向游标
//!
//! 坐标采用 PDF 习惯：单位 pt，原点在页面左下角，y 向下递减。

/// 页面几何（pt）
#[derive(Debug, Clone, Copy)]
pub struct PageMetrics {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageMetrics {
    /// 美式 Letter 纸（612 × 792 pt），四边 1 英寸边距
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_left: 72.0,
            margin_right: 72.0,
            margin_top: 72.0,
            margin_bottom: 72.0,
        }
    }

    /// 正文可用宽度
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// 首行基线的 y 坐标
    pub fn top_y(&self) -> f32 {
        self.height - self.margin_top
    }
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self::letter()
    }
}

/// 排版游标
///
/// 不变式：`y` 绝不越过下边距；放不下时先 `page += 1` 并回到
/// 上边距再继续。游标归单次渲染过程独占，段落之间只传递
/// `y` 与 `page` 的运行值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub x: f32,
    pub y: f32,
    pub page: usize,
}

impl LayoutCursor {
    /// 置于首页页首
    pub fn top_of(metrics: &PageMetrics) -> Self {
        Self {
            x: metrics.margin_left,
            y: metrics.top_y(),
            page: 0,
        }
    }

    /// 确认当前位置还放得下高度 `needed` 的内容，放不下则翻页
    ///
    /// # 返回
    /// 返回是否发生了翻页（调用方负责让画布新开一页）
    pub fn ensure_room(&mut self, needed: f32, metrics: &PageMetrics) -> bool {
        if self.y - needed < metrics.margin_bottom {
            self.page += 1;
            self.y = metrics.top_y();
            self.x = metrics.margin_left;
            true
        } else {
            false
        }
    }

    /// 画完一行后下移一个行高
    pub fn advance_line(&mut self, line_height: f32) {
        self.y -= line_height;
    }

    /// 段落收尾追加段距
    pub fn end_paragraph(&mut self, spacing: f32) {
        self.y -= spacing;
    }
}
