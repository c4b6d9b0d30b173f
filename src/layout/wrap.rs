//! 贪婪断行
//!
//! 把 token 序列按注入的测量函数塞进不超过最大宽度的行。
//! 没有连字符、没有词界逻辑：纯 token 级贪婪装箱，
//! 标记段整段量宽，普通字符逐字量宽。

use crate::layout::token::Token;

/// 排好的一行
#[derive(Debug, Clone)]
pub struct Line {
    pub tokens: Vec<Token>,
    /// 行内 token 的累计测量宽度
    pub width: f32,
}

/// 贪婪断行
///
/// 规则：
/// - token 依序累加，累计宽度不超过 `max_width` 就留在当前行
/// - 第一个放不下的 token 结束当前行并开启新行
/// - 单个 token 自身超宽时独占一行（不会死循环）
/// - 结尾残留的缓冲作为最后一行输出
pub fn break_lines<F>(tokens: &[Token], max_width: f32, measure: F) -> Vec<Line>
where
    F: Fn(&Token) -> f32,
{
    let mut lines = Vec::new();
    let mut buf: Vec<Token> = Vec::new();
    let mut width = 0.0f32;

    for token in tokens {
        let w = measure(token);
        if !buf.is_empty() && width + w > max_width {
            lines.push(Line {
                tokens: std::mem::take(&mut buf),
                width,
            });
            width = 0.0;
        }
        buf.push(token.clone());
        width += w;
    }

    if !buf.is_empty() {
        lines.push(Line { tokens: buf, width });
    }

    lines
}
