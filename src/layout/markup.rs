//! 行内标记解析
//!
//! 支持两种互不嵌套、互不重叠的标记：
//! - 专名号 `【文字】`，旧式资料亦有 `【】文字【】` 双标写法，须优先识别
//! - 填空目标 `〖詞語〗`
//!
//! 任何输入都不会导致解析失败：未闭合或残缺的标记按字面字符
//! 原样输出，最坏情况是版面不好看，绝不中断渲染。

use crate::layout::token::Token;

/// 把一段句子切分为排版 token 序列
pub fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '【' => {
                if chars.get(i + 1) == Some(&'】') {
                    // 双标形式：【】文字【】
                    if let Some(j) = find_empty_pair(&chars, i + 2) {
                        let inner: String = chars[i + 2..j].iter().collect();
                        if !inner.is_empty() {
                            tokens.push(Token::Underline(inner));
                        }
                        i = j + 2;
                    } else {
                        // 孤立的空标记对：零宽段，整对丢弃
                        i += 2;
                    }
                } else if let Some(k) = find_close(&chars, i + 1, '】') {
                    let inner: String = chars[i + 1..k].iter().collect();
                    if !inner.is_empty() {
                        tokens.push(Token::Underline(inner));
                    }
                    i = k + 1;
                } else {
                    // 未闭合，按字面输出
                    tokens.push(Token::Plain('【'));
                    i += 1;
                }
            }
            '〖' => {
                if let Some(k) = find_close(&chars, i + 1, '〗') {
                    let inner: String = chars[i + 1..k].iter().collect();
                    if !inner.is_empty() {
                        tokens.push(Token::Target(inner));
                    }
                    i = k + 1;
                } else {
                    tokens.push(Token::Plain('〖'));
                    i += 1;
                }
            }
            c => {
                tokens.push(Token::Plain(c));
                i += 1;
            }
        }
    }

    tokens
}

/// 从 `from` 起找到第一个 `close` 字符的位置
fn find_close(chars: &[char], from: usize, close: char) -> Option<usize> {
    (from..chars.len()).find(|&k| chars[k] == close)
}

/// 从 `from` 起找到下一对相邻 `【】` 的起始位置
fn find_empty_pair(chars: &[char], from: usize) -> Option<usize> {
    if chars.len() < 2 {
        return None;
    }
    (from..chars.len() - 1).find(|&j| chars[j] == '【' && chars[j + 1] == '】')
}
