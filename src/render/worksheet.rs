//! 工作纸渲染
//!
//! 渲染状态机：标题 → 日期 → 题目*（题号 + 断行内容，必要时翻页）
//! → 词语表（学生版，另起一页，两栏交错排列）。
//! 教师版把填空目标以红色原词呈现，不附词语表。

use chrono::{Days, Local};

use crate::layout::{blank_text, break_lines, tokenize, LayoutCursor, PageMetrics, Token};
use crate::models::Question;
use crate::render::canvas::{Canvas, Ink};

/// 工作纸版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// 学生版：填空目标挖空
    Student,
    /// 教师版：填空目标红字显示（答案卷）
    AnswerKey,
}

/// 工作纸渲染器
#[derive(Debug, Clone)]
pub struct WorksheetRenderer {
    pub metrics: PageMetrics,
    pub title_size: f32,
    pub body_size: f32,
    pub line_height: f32,
    pub paragraph_spacing: f32,
    /// 题号悬挂缩进
    pub number_indent: f32,
}

impl Default for WorksheetRenderer {
    fn default() -> Self {
        Self {
            metrics: PageMetrics::letter(),
            title_size: 20.0,
            body_size: 14.0,
            line_height: 20.0,
            paragraph_spacing: 10.8,
            number_indent: 25.0,
        }
    }
}

impl WorksheetRenderer {
    /// 文档标题
    pub fn title_text(
        &self,
        school: &str,
        level: &str,
        student: Option<&str>,
        variant: Variant,
    ) -> String {
        let base = match student {
            Some(name) => format!("{} ({}) - {} - 校本填充工作紙", school, level, name),
            None => format!("{} ({}) - 校本填充工作紙", school, level),
        };
        match variant {
            Variant::Student => base,
            Variant::AnswerKey => format!("{}（教師版）", base),
        }
    }

    /// 渲染整份文档
    ///
    /// 没有题目时只输出标题与日期，不视为错误。
    pub fn render<C: Canvas>(
        &self,
        canvas: &mut C,
        school: &str,
        level: &str,
        student: Option<&str>,
        questions: &[Question],
        variant: Variant,
    ) {
        let mut cursor = LayoutCursor::top_of(&self.metrics);

        self.draw_title(canvas, &mut cursor, school, level, student, variant);
        self.draw_date(canvas, &mut cursor);

        for (i, question) in questions.iter().enumerate() {
            self.draw_question(canvas, &mut cursor, i + 1, question, variant);
        }

        if variant == Variant::Student && !questions.is_empty() {
            self.draw_word_list(canvas, &mut cursor, questions);
        }
    }

    fn draw_title<C: Canvas>(
        &self,
        canvas: &mut C,
        cursor: &mut LayoutCursor,
        school: &str,
        level: &str,
        student: Option<&str>,
        variant: Variant,
    ) {
        let title = self.title_text(school, level, student, variant);
        let width = canvas.text_width(&title, self.title_size);
        let x = ((self.metrics.width - width) / 2.0).max(self.metrics.margin_left);
        canvas.draw_text(x, cursor.y, self.title_size, Ink::Body, &title);
        cursor.advance_line(self.title_size + 12.0);
        cursor.end_paragraph(14.4);
    }

    fn draw_date<C: Canvas>(&self, canvas: &mut C, cursor: &mut LayoutCursor) {
        let text = date_label();
        canvas.draw_text(
            self.metrics.margin_left,
            cursor.y,
            self.body_size,
            Ink::Body,
            &text,
        );
        cursor.advance_line(self.line_height);
        cursor.end_paragraph(21.6);
    }

    fn draw_question<C: Canvas>(
        &self,
        canvas: &mut C,
        cursor: &mut LayoutCursor,
        number: usize,
        question: &Question,
        variant: Variant,
    ) {
        let tokens = presented(tokenize(&question.content), variant);
        let wrap_width = self.metrics.content_width() - self.number_indent;
        let lines = break_lines(&tokens, wrap_width, |t| {
            canvas.text_width(&t.visible(), self.body_size)
        });
        let text_x = self.metrics.margin_left + self.number_indent;

        if cursor.ensure_room(self.line_height, &self.metrics) {
            self.begin_continuation(canvas, cursor);
        }
        canvas.draw_text(
            self.metrics.margin_left,
            cursor.y,
            self.body_size,
            Ink::Body,
            &format!("{}.", number),
        );

        let mut first = true;
        for line in &lines {
            if !first && cursor.ensure_room(self.line_height, &self.metrics) {
                self.begin_continuation(canvas, cursor);
            }
            first = false;

            let mut x = text_x;
            for token in &line.tokens {
                let (ink, underline) = token_style(token, variant);
                let text = token.visible();
                let width = canvas.text_width(&text, self.body_size);
                canvas.draw_text(x, cursor.y, self.body_size, ink, &text);
                if underline {
                    canvas.draw_rule(x, x + width, cursor.y - 2.0);
                }
                x += width;
            }
            cursor.advance_line(self.line_height);
        }
        if lines.is_empty() {
            cursor.advance_line(self.line_height);
        }
        cursor.end_paragraph(self.paragraph_spacing);
    }

    /// 学生版词语表：另起一页，两栏交错，每两个词语换一行
    fn draw_word_list<C: Canvas>(
        &self,
        canvas: &mut C,
        cursor: &mut LayoutCursor,
        questions: &[Question],
    ) {
        canvas.begin_page();
        cursor.page += 1;
        cursor.y = self.metrics.top_y();
        cursor.x = self.metrics.margin_left;

        let heading = "詞語表";
        let width = canvas.text_width(heading, self.title_size);
        canvas.draw_text(
            (self.metrics.width - width) / 2.0,
            cursor.y,
            self.title_size,
            Ink::Body,
            heading,
        );
        cursor.advance_line(self.title_size + 12.0);
        cursor.end_paragraph(14.4);

        let column_width = self.metrics.content_width() / 2.0;
        for (i, question) in questions.iter().enumerate() {
            let column = i % 2;
            if column == 0 && cursor.ensure_room(self.line_height, &self.metrics) {
                self.begin_continuation(canvas, cursor);
            }
            let x = self.metrics.margin_left + column as f32 * column_width;
            canvas.draw_text(
                x,
                cursor.y,
                self.body_size,
                Ink::Body,
                &format!("{}. {}", i + 1, question.word),
            );
            if column == 1 {
                cursor.advance_line(self.line_height);
            }
        }
        if questions.len() % 2 == 1 {
            cursor.advance_line(self.line_height);
        }
    }

    fn begin_continuation<C: Canvas>(&self, canvas: &mut C, cursor: &mut LayoutCursor) {
        canvas.begin_page();
        canvas.draw_text(
            self.metrics.margin_left,
            cursor.y,
            self.body_size,
            Ink::Body,
            "（續）",
        );
        cursor.advance_line(self.line_height);
    }
}

/// 工作纸日期行：固定为翌日
pub fn date_label() -> String {
    let today = Local::now().date_naive();
    let date = today.checked_add_days(Days::new(1)).unwrap_or(today);
    format!("日期: {}", date.format("%Y-%m-%d"))
}

/// 按版本替换填空目标的显示文字
fn presented(tokens: Vec<Token>, variant: Variant) -> Vec<Token> {
    match variant {
        Variant::Student => tokens
            .into_iter()
            .map(|t| match t {
                Token::Target(word) => Token::Target(blank_text(&word)),
                other => other,
            })
            .collect(),
        Variant::AnswerKey => tokens,
    }
}

/// 按版本决定 token 的着墨与底线
fn token_style(token: &Token, variant: Variant) -> (Ink, bool) {
    match token {
        Token::Plain(_) => (Ink::Body, false),
        Token::Underline(_) => (Ink::Body, true),
        Token::Target(_) => match variant {
            Variant::Student => (Ink::Body, false),
            Variant::AnswerKey => (Ink::Accent, false),
        },
    }
}
