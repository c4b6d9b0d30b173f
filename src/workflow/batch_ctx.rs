//! 批次上下文 - 流程层
//!
//! 一个批次 = 一个学校 + 年级组合。上下文对象随单次处理过程
//! 存活，承载审核人选定的最终句子，不存在任何进程级全局状态。

use std::collections::HashMap;

use crate::models::question::Question;
use crate::models::review::{ReviewRow, Status};

/// 批次上下文
#[derive(Debug, Clone)]
pub struct BatchCtx {
    pub school: String,
    pub level: String,
    /// 时间戳 → 审核人选定的最终句子
    chosen: HashMap<String, String>,
}

impl BatchCtx {
    pub fn new(school: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            school: school.into(),
            level: level.into(),
            chosen: HashMap::new(),
        }
    }

    /// 记录审核人为某行选定的句子
    pub fn choose(&mut self, timestamp: impl Into<String>, sentence: impl Into<String>) {
        self.chosen.insert(timestamp.into(), sentence.into());
    }

    /// 本批次包含的行
    pub fn rows_in_batch<'a>(&self, rows: &'a [ReviewRow]) -> Vec<&'a ReviewRow> {
        rows.iter()
            .filter(|r| r.school == self.school && r.level == self.level)
            .collect()
    }

    /// 是否全部句子都已审批（没有 Pending 行）
    pub fn all_ready(&self, rows: &[ReviewRow]) -> bool {
        !self
            .rows_in_batch(rows)
            .iter()
            .any(|r| r.status == Status::Pending)
    }

    /// 构建最终题目清单：每个词语取首行，句子以选定值优先
    pub fn build_questions(&self, rows: &[ReviewRow]) -> Vec<Question> {
        let mut seen: Vec<&str> = Vec::new();
        let mut questions = Vec::new();
        for row in self.rows_in_batch(rows) {
            if seen.contains(&row.word.as_str()) {
                continue;
            }
            seen.push(&row.word);
            let sentence = self
                .chosen
                .get(&row.timestamp)
                .cloned()
                .unwrap_or_else(|| row.sentence.clone());
            questions.push(Question::new(
                &row.word,
                sentence,
                &self.school,
                &self.level,
            ));
        }
        questions
    }

    /// 本批次全部行的时间戳（写回状态用）
    pub fn timestamps(&self, rows: &[ReviewRow]) -> Vec<String> {
        self.rows_in_batch(rows)
            .iter()
            .map(|r| r.timestamp.clone())
            .collect()
    }

    /// 写回的句子：有选定值用选定值，否则保留原句
    pub fn sentence_updates(&self, rows: &[ReviewRow]) -> HashMap<String, String> {
        self.rows_in_batch(rows)
            .iter()
            .map(|r| {
                let sentence = self
                    .chosen
                    .get(&r.timestamp)
                    .cloned()
                    .unwrap_or_else(|| r.sentence.clone());
                (r.timestamp.clone(), sentence)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::review::Source;

    fn row(ts: &str, word: &str, sentence: &str, status: Status) -> ReviewRow {
        ReviewRow {
            timestamp: ts.to_string(),
            school: "培正小學".to_string(),
            level: "小三".to_string(),
            word: word.to_string(),
            sentence: sentence.to_string(),
            source: Source::Db,
            status,
        }
    }

    fn rows() -> Vec<ReviewRow> {
        vec![
            row("t1", "定期", "小明〖定期〗檢查牙齒。", Status::Ready),
            row("t2", "努力", "大家都很〖努力〗。", Status::Ready),
            // 同一词语的第二条候选句
            row("t3", "努力", "他十分〖努力〗。", Status::Ready),
        ]
    }

    #[test]
    fn test_one_question_per_word_in_order() {
        let ctx = BatchCtx::new("培正小學", "小三");
        let questions = ctx.build_questions(&rows());
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].word, "定期");
        assert_eq!(questions[1].word, "努力");
        assert_eq!(questions[1].content, "大家都很〖努力〗。");
    }

    #[test]
    fn test_chosen_sentence_overrides() {
        let mut ctx = BatchCtx::new("培正小學", "小三");
        ctx.choose("t1", "她〖定期〗整理房間。");
        let questions = ctx.build_questions(&rows());
        assert_eq!(questions[0].content, "她〖定期〗整理房間。");
    }

    #[test]
    fn test_other_batches_excluded() {
        let mut all = rows();
        let mut other = row("t9", "快樂", "她很〖快樂〗。", Status::Ready);
        other.school = "另一小學".to_string();
        all.push(other);

        let ctx = BatchCtx::new("培正小學", "小三");
        assert_eq!(ctx.rows_in_batch(&all).len(), 3);
        assert_eq!(ctx.timestamps(&all), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_all_ready_detects_pending() {
        let mut all = rows();
        let ctx = BatchCtx::new("培正小學", "小三");
        assert!(ctx.all_ready(&all));

        all.push(row("t4", "香港", "＊我愛【香港】。", Status::Pending));
        assert!(!ctx.all_ready(&all));
    }

    #[test]
    fn test_sentence_updates_keep_unchosen_rows() {
        let mut ctx = BatchCtx::new("培正小學", "小三");
        ctx.choose("t2", "改過的句子。");
        let updates = ctx.sentence_updates(&rows());
        assert_eq!(updates["t2"], "改過的句子。");
        // 未选定的行保留原句，不会被清空
        assert_eq!(updates["t1"], "小明〖定期〗檢查牙齒。");
    }
}
