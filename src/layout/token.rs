/// 排版 token
///
/// 标记段（专名号、填空目标）各自构成一个不可再分的 token，
/// 断行只会发生在 token 之间；普通文字逐字成 token，
/// 中文没有词界空格，任意两个字之间都可以断行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// 标记外的单个字符
    Plain(char),
    /// 专名号段，整段加底线
    Underline(String),
    /// 填空目标段：学生版挖空、教师版着色
    Target(String),
}

impl Token {
    /// token 的可见文字（剥掉标记符号后的内容）
    pub fn visible(&self) -> String {
        match self {
            Token::Plain(c) => c.to_string(),
            Token::Underline(s) | Token::Target(s) => s.clone(),
        }
    }

    /// 还原为带标记的原始写法
    pub fn markup(&self) -> String {
        match self {
            Token::Plain(c) => c.to_string(),
            Token::Underline(s) => format!("【{}】", s),
            Token::Target(s) => format!("〖{}〗", s),
        }
    }
}

/// 按顺序拼接 token 序列的可见文字
pub fn visible_text(tokens: &[Token]) -> String {
    tokens.iter().map(Token::visible).collect()
}

/// 按顺序还原 token 序列的带标记写法
pub fn markup_text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.markup()).collect()
}

/// 填空线文字：长度为词语字数两倍的全角底线，最少四格
pub fn blank_text(word: &str) -> String {
    let n = word.chars().count().saturating_mul(2).max(4);
    "＿".repeat(n)
}
