//! 审核表服务 - 业务能力层
//!
//! 负责 Review 表的读取、校验、筛选与状态写回。
//! 读取走 30 秒 TTL 缓存减少重复网络调用；写回前重新拉取
//! 最新行号，以时间戳建一次索引，绝不逐行重扫。

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use crate::clients::sheets::{column_letter, CellUpdate, SheetStore};
use crate::config::Config;
use crate::error::{AppError, SheetError};
use crate::models::review::{strip_ai_marker, ReviewRow, Source, Status};

/// Review 表必要栏位
pub const REQUIRED_COLS: [&str; 7] =
    ["Timestamp", "學校", "年級", "詞語", "句子", "來源", "狀態"];

struct CacheEntry {
    rows: Vec<ReviewRow>,
    fetched_at: Instant,
}

/// 审核表服务
pub struct ReviewService<S: SheetStore> {
    store: S,
    sheet: String,
    ttl: Duration,
    cache: Mutex<Option<CacheEntry>>,
}

impl<S: SheetStore> ReviewService<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            sheet: config.review_sheet.clone(),
            ttl: Duration::from_secs(config.cache_ttl_secs),
            cache: Mutex::new(None),
        }
    }

    /// 读取全部审核行（走缓存）
    pub async fn load_review(&self) -> Result<Vec<ReviewRow>> {
        {
            let guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = guard.as_ref() {
                if entry.fetched_at.elapsed() < self.ttl {
                    debug!("Review 缓存命中 ({} 行)", entry.rows.len());
                    return Ok(entry.rows.clone());
                }
            }
        }

        let values = self.store.fetch_values(&self.sheet).await?;
        let rows = parse_review_table(&self.sheet, &values)?;

        let mut guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(CacheEntry {
            rows: rows.clone(),
            fetched_at: Instant::now(),
        });
        Ok(rows)
    }

    /// 手动清除缓存（对应界面上的 Refresh 按钮）
    pub fn refresh(&self) {
        let mut guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// 列出待处理行：状态为 Ready 或 Pending，可按年级过滤
    pub async fn list_pending(&self, level: Option<&str>) -> Result<Vec<ReviewRow>> {
        let rows = self.load_review().await?;
        Ok(rows
            .into_iter()
            .filter(|row| row.status.is_actionable())
            .filter(|row| level.map(|l| row.level == l).unwrap_or(true))
            .collect())
    }

    /// 批量写回状态（可同时写回选定句子）
    ///
    /// # 返回
    /// 返回实际更新的行数
    pub async fn mark_rows(
        &self,
        timestamps: &[String],
        new_status: Status,
        sentence_updates: Option<&HashMap<String, String>>,
    ) -> Result<usize> {
        if timestamps.is_empty() {
            return Ok(0);
        }

        // 写回前拉最新数据取行号，不走缓存
        let values = self.store.fetch_values(&self.sheet).await?;
        let columns = resolve_columns(&self.sheet, &values)?;

        // 以时间戳建一次索引；同一时间戳可能对应多行（AI 候选句）
        let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, row) in values.iter().enumerate().skip(1) {
            let ts = row
                .get(columns.timestamp)
                .map(|s| s.trim())
                .unwrap_or_default();
            if !ts.is_empty() {
                // 表头占第 1 行，数据行号从 2 起
                index.entry(ts).or_default().push(i + 1);
            }
        }

        let mut updates = Vec::new();
        let mut touched = 0;
        for ts in timestamps {
            let Some(row_numbers) = index.get(ts.trim()) else {
                warn!("⚠️ 找不到时间戳 {} 对应的行，跳过", ts);
                continue;
            };
            for &row_number in row_numbers {
                updates.push(CellUpdate {
                    range: format!("{}{}", column_letter(columns.status), row_number),
                    value: new_status.label().to_string(),
                });
                if let Some(sentences) = sentence_updates {
                    if let Some(sentence) = sentences.get(ts) {
                        updates.push(CellUpdate {
                            range: format!("{}{}", column_letter(columns.sentence), row_number),
                            value: sentence.clone(),
                        });
                    }
                }
                touched += 1;
            }
        }

        self.store.batch_update(&self.sheet, &updates).await?;
        self.refresh();
        Ok(touched)
    }

    /// 返工：把指定行退回 Pending 重新审批
    pub async fn reset_rows(&self, timestamps: &[String]) -> Result<usize> {
        self.mark_rows(timestamps, Status::Pending, None).await
    }
}

struct ReviewColumns {
    timestamp: usize,
    sentence: usize,
    status: usize,
}

/// 校验表头并返回写回需要的列号
fn resolve_columns(sheet: &str, values: &[Vec<String>]) -> Result<ReviewColumns> {
    if values.is_empty() {
        return Err(AppError::Sheet(SheetError::EmptySheet {
            sheet: sheet.to_string(),
        })
        .into());
    }
    let header: Vec<String> = values[0].iter().map(|h| h.trim().to_string()).collect();
    let missing: Vec<String> = REQUIRED_COLS
        .iter()
        .filter(|c| !header.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::missing_columns(sheet, missing, header).into());
    }

    let find = |name: &str| header.iter().position(|h| h == name).unwrap_or(0);
    Ok(ReviewColumns {
        timestamp: find("Timestamp"),
        sentence: find("句子"),
        status: find("狀態"),
    })
}

/// 把原始表格解析为审核行
///
/// 状态无法识别的行跳过并告警，其余行继续处理。
fn parse_review_table(sheet: &str, values: &[Vec<String>]) -> Result<Vec<ReviewRow>> {
    let columns = resolve_columns(sheet, values)?;
    let header: Vec<String> = values[0].iter().map(|h| h.trim().to_string()).collect();
    let find = |name: &str| header.iter().position(|h| h == name).unwrap_or(0);
    let school_col = find("學校");
    let level_col = find("年級");
    let word_col = find("詞語");
    let source_col = find("來源");

    let cell = |row: &Vec<String>, col: usize| -> String {
        row.get(col).map(|s| s.trim().to_string()).unwrap_or_default()
    };

    let mut rows = Vec::new();
    for (i, raw) in values.iter().enumerate().skip(1) {
        let timestamp = cell(raw, columns.timestamp);
        if timestamp.is_empty() {
            continue;
        }

        let status_text = cell(raw, columns.status);
        let Some(status) = Status::parse(&status_text) else {
            warn!(
                "⚠️ 第 {} 行状态无法识别: '{}'，跳过该行",
                i + 1,
                status_text
            );
            continue;
        };

        let raw_sentence = cell(raw, columns.sentence);
        let (sentence, marked_ai) = strip_ai_marker(&raw_sentence);
        let source = Source::parse(&cell(raw, source_col)).unwrap_or(if marked_ai {
            Source::Ai
        } else {
            Source::Db
        });

        rows.push(ReviewRow {
            timestamp,
            school: cell(raw, school_col),
            level: cell(raw, level_col),
            word: cell(raw, word_col),
            sentence: sentence.to_string(),
            source,
            status,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// 内存表格，记录写回内容
    struct MemorySheet {
        values: Vec<Vec<String>>,
        updates: StdMutex<Vec<CellUpdate>>,
        fetch_count: StdMutex<usize>,
    }

    impl MemorySheet {
        fn new(values: Vec<Vec<String>>) -> Self {
            Self {
                values,
                updates: StdMutex::new(Vec::new()),
                fetch_count: StdMutex::new(0),
            }
        }
    }

    impl SheetStore for &MemorySheet {
        async fn fetch_values(&self, _sheet: &str) -> Result<Vec<Vec<String>>> {
            *self.fetch_count.lock().unwrap() += 1;
            Ok(self.values.clone())
        }

        async fn batch_update(&self, _sheet: &str, updates: &[CellUpdate]) -> Result<()> {
            self.updates.lock().unwrap().extend_from_slice(updates);
            Ok(())
        }
    }

    fn row(ts: &str, word: &str, sentence: &str, source: &str, status: &str) -> Vec<String> {
        vec![
            ts.to_string(),
            "培正小學".to_string(),
            "小三".to_string(),
            word.to_string(),
            sentence.to_string(),
            source.to_string(),
            status.to_string(),
        ]
    }

    fn header() -> Vec<String> {
        REQUIRED_COLS.iter().map(|c| c.to_string()).collect()
    }

    fn sample_table() -> Vec<Vec<String>> {
        vec![
            header(),
            row("t1", "定期", "小明〖定期〗檢查牙齒。", "DB", "Ready"),
            row("t2", "努力", "＊大家都很〖努力〗。", "", "Pending"),
            row("t3", "香港", "他住在【香港】。", "DB", "Loaded"),
            row("t4", "快樂", "她很〖快樂〗。", "DB", "Sent"),
        ]
    }

    fn service(sheet: &MemorySheet) -> ReviewService<&MemorySheet> {
        ReviewService::new(sheet, &Config::default())
    }

    #[tokio::test]
    async fn test_list_pending_excludes_loaded_and_sent() {
        let sheet = MemorySheet::new(sample_table());
        let svc = service(&sheet);
        let pending = svc.list_pending(None).await.unwrap();
        let timestamps: Vec<&str> = pending.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(timestamps, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_ai_marker_infers_source() {
        let sheet = MemorySheet::new(sample_table());
        let svc = service(&sheet);
        let rows = svc.load_review().await.unwrap();
        let ai_row = rows.iter().find(|r| r.timestamp == "t2").unwrap();
        assert_eq!(ai_row.source, Source::Ai);
        // 标记字符已剥除
        assert_eq!(ai_row.sentence, "大家都很〖努力〗。");
    }

    #[tokio::test]
    async fn test_missing_column_reports_found_columns() {
        let mut table = sample_table();
        table[0].remove(6); // 去掉狀態栏
        let sheet = MemorySheet::new(table);
        let svc = service(&sheet);
        let err = svc.load_review().await.unwrap_err();
        let app_err = err.downcast_ref::<AppError>().unwrap();
        match app_err {
            AppError::Sheet(SheetError::MissingColumns { missing, found, .. }) => {
                assert_eq!(missing, &vec!["狀態".to_string()]);
                assert!(found.contains(&"句子".to_string()));
            }
            other => panic!("应为 MissingColumns，得到 {}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_sheet_is_reported() {
        let sheet = MemorySheet::new(Vec::new());
        let svc = service(&sheet);
        let err = svc.load_review().await.unwrap_err();
        let app_err = err.downcast_ref::<AppError>().unwrap();
        assert!(matches!(
            app_err,
            AppError::Sheet(SheetError::EmptySheet { .. })
        ));
    }

    #[tokio::test]
    async fn test_cache_avoids_refetch_until_refreshed() {
        let sheet = MemorySheet::new(sample_table());
        let svc = service(&sheet);
        svc.load_review().await.unwrap();
        svc.load_review().await.unwrap();
        assert_eq!(*sheet.fetch_count.lock().unwrap(), 1);

        svc.refresh();
        svc.load_review().await.unwrap();
        assert_eq!(*sheet.fetch_count.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_mark_rows_writes_status_and_sentence() {
        let sheet = MemorySheet::new(sample_table());
        let svc = service(&sheet);

        let mut sentences = HashMap::new();
        sentences.insert("t1".to_string(), "小明〖定期〗運動。".to_string());

        let touched = svc
            .mark_rows(
                &["t1".to_string(), "t2".to_string()],
                Status::Loaded,
                Some(&sentences),
            )
            .await
            .unwrap();
        assert_eq!(touched, 2);

        let updates = sheet.updates.lock().unwrap();
        // t1 在数据第 1 行（表格第 2 行）：狀態在 G、句子在 E
        assert!(updates
            .iter()
            .any(|u| u.range == "G2" && u.value == "Loaded"));
        assert!(updates
            .iter()
            .any(|u| u.range == "E2" && u.value == "小明〖定期〗運動。"));
        assert!(updates
            .iter()
            .any(|u| u.range == "G3" && u.value == "Loaded"));
        // t2 没有句子更新
        assert!(!updates.iter().any(|u| u.range == "E3"));
    }

    #[tokio::test]
    async fn test_mark_rows_unknown_timestamp_skipped() {
        let sheet = MemorySheet::new(sample_table());
        let svc = service(&sheet);
        let touched = svc
            .mark_rows(&["沒有這行".to_string()], Status::Sent, None)
            .await
            .unwrap();
        assert_eq!(touched, 0);
        assert!(sheet.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_rows_moves_back_to_pending() {
        let sheet = MemorySheet::new(sample_table());
        let svc = service(&sheet);
        let touched = svc.reset_rows(&["t3".to_string()]).await.unwrap();
        assert_eq!(touched, 1);
        let updates = sheet.updates.lock().unwrap();
        assert!(updates
            .iter()
            .any(|u| u.range == "G4" && u.value == "Pending"));
    }
}
