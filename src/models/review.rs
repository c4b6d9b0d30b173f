use phf::phf_map;
use serde::{Deserialize, Serialize};

/// 审核行状态
///
/// 正常流向: Ready/Pending → Loaded → Sent
/// 返工流向: Loaded → Pending（仅限显式 reset 操作）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// DB 句子，可直接使用
    Ready,
    /// AI 句子，需要审批
    Pending,
    /// 已被程序取走处理中
    Loaded,
    /// 已发送，不再显示
    Sent,
}

/// 状态标签对照表（接受英文及繁体中文写法）
static STATUS_LABELS: phf::Map<&'static str, Status> = phf_map! {
    "Ready" => Status::Ready,
    "就緒" => Status::Ready,
    "Pending" => Status::Pending,
    "待審" => Status::Pending,
    "待審批" => Status::Pending,
    "Loaded" => Status::Loaded,
    "已載入" => Status::Loaded,
    "Sent" => Status::Sent,
    "已發送" => Status::Sent,
};

impl Status {
    /// 写回表格时使用的标准名称
    pub fn label(self) -> &'static str {
        match self {
            Status::Ready => "Ready",
            Status::Pending => "Pending",
            Status::Loaded => "Loaded",
            Status::Sent => "Sent",
        }
    }

    /// 从单元格文字解析状态
    pub fn parse(s: &str) -> Option<Self> {
        STATUS_LABELS.get(s.trim()).copied()
    }

    /// 是否仍待处理（会出现在待办清单中）
    pub fn is_actionable(self) -> bool {
        matches!(self, Status::Ready | Status::Pending)
    }

    /// 正常流向是否允许转移到 `next`
    pub fn can_advance_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Ready, Status::Loaded)
                | (Status::Pending, Status::Loaded)
                | (Status::Loaded, Status::Sent)
        )
    }

    /// 返工流向是否允许转移到 `next`
    pub fn can_reset_to(self, next: Status) -> bool {
        matches!((self, next), (Status::Loaded, Status::Pending))
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 句子来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// 资料库既有句子
    Db,
    /// AI 生成句子
    Ai,
}

static SOURCE_LABELS: phf::Map<&'static str, Source> = phf_map! {
    "DB" => Source::Db,
    "資料庫" => Source::Db,
    "AI" => Source::Ai,
};

/// 部分旧表单用句子开头的全角星号标记 AI 句子
pub const AI_SENTENCE_MARKER: char = '＊';

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::Db => "DB",
            Source::Ai => "AI",
        }
    }

    /// 从单元格文字解析来源
    pub fn parse(s: &str) -> Option<Self> {
        SOURCE_LABELS.get(s.trim()).copied()
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 去掉句子开头的 AI 标记字符
///
/// # 返回
/// 返回 (去标记后的句子, 是否带有标记)
pub fn strip_ai_marker(sentence: &str) -> (&str, bool) {
    match sentence.strip_prefix(AI_SENTENCE_MARKER) {
        Some(rest) => (rest.trim_start(), true),
        None => (sentence, false),
    }
}

/// Review 表的一行：某学校/年级下一个词语的一条候选句子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRow {
    /// 表单提交时间戳，作为行的自然键
    pub timestamp: String,
    pub school: String,
    pub level: String,
    pub word: String,
    pub sentence: String,
    pub source: Source,
    pub status: Status,
}

impl ReviewRow {
    /// 批次键（学校 + 年级）
    pub fn batch_key(&self) -> (String, String) {
        (self.school.clone(), self.level.clone())
    }
}
