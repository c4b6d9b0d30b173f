//! 行内标记排版引擎
//!
//! 负责把含行内标记的句子切分为 token、按像素宽度贪婪断行、
//! 并维护跨段落的纵向游标与分页判断。引擎本身不依赖任何
//! 绘图后端，宽度测量函数由调用方注入。

pub mod cursor;
pub mod markup;
pub mod token;
pub mod wrap;

pub use cursor::{LayoutCursor, PageMetrics};
pub use markup::tokenize;
pub use token::{blank_text, markup_text, visible_text, Token};
pub use wrap::{break_lines, Line};
