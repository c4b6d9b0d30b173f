use serde::{Deserialize, Serialize};

/// 已批准的题目：一个词语配一条最终句子
///
/// 句子内可含行内标记（专名号、填空目标），由排版引擎解析。
/// 批准后在单次渲染过程中不再修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// 目标词语，同时用作填空答案标签
    pub word: String,
    /// 句子原文，可含行内标记
    pub content: String,
    pub school: String,
    pub level: String,
}

impl Question {
    pub fn new(
        word: impl Into<String>,
        content: impl Into<String>,
        school: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            content: content.into(),
            school: school.into(),
            level: level.into(),
        }
    }
}
