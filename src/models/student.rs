use serde::{Deserialize, Serialize};

/// 學生資料表的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRow {
    pub school: String,
    pub level: String,
    /// 狀態栏为 "Y" 时参与寄送
    pub active: bool,
    pub name: String,
    pub parent_email: String,
    /// 老師 Email，可留空或填 N/A
    pub teacher_email: Option<String>,
}

impl StudentRow {
    /// 是否属于指定学校/年级且状态有效
    pub fn matches(&self, school: &str, level: &str) -> bool {
        self.active && self.school == school && self.level == level
    }
}
