//! 学生资料服务 - 业务能力层
//!
//! 读取學生資料表并按学校/年级匹配要寄送的学生。

use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::clients::sheets::SheetStore;
use crate::config::Config;
use crate::error::{AppError, SheetError};
use crate::models::student::StudentRow;

/// 學生資料表必要栏位
pub const REQUIRED_COLS: [&str; 5] = ["學校", "年級", "狀態", "學生姓名", "家長 Email"];

const TEACHER_EMAIL_COL: &str = "老師 Email";

struct CacheEntry {
    rows: Vec<StudentRow>,
    fetched_at: Instant,
}

/// 学生资料服务
pub struct StudentService<S: SheetStore> {
    store: S,
    sheet: String,
    ttl: Duration,
    cache: Mutex<Option<CacheEntry>>,
}

impl<S: SheetStore> StudentService<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            sheet: config.students_sheet.clone(),
            ttl: Duration::from_secs(config.cache_ttl_secs),
            cache: Mutex::new(None),
        }
    }

    /// 读取全部学生行（走缓存）
    pub async fn load_students(&self) -> Result<Vec<StudentRow>> {
        {
            let guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = guard.as_ref() {
                if entry.fetched_at.elapsed() < self.ttl {
                    debug!("學生資料缓存命中 ({} 行)", entry.rows.len());
                    return Ok(entry.rows.clone());
                }
            }
        }

        let values = self.store.fetch_values(&self.sheet).await?;
        let rows = parse_student_table(&self.sheet, &values)?;

        let mut guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(CacheEntry {
            rows: rows.clone(),
            fetched_at: Instant::now(),
        });
        Ok(rows)
    }

    /// 手动清除缓存
    pub fn refresh(&self) {
        let mut guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// 指定学校/年级下状态有效的学生
    pub async fn match_students(&self, school: &str, level: &str) -> Result<Vec<StudentRow>> {
        let rows = self.load_students().await?;
        Ok(rows
            .into_iter()
            .filter(|s| s.matches(school, level))
            .collect())
    }
}

fn parse_student_table(sheet: &str, values: &[Vec<String>]) -> Result<Vec<StudentRow>> {
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

    let find = |name: &str| header.iter().position(|h| h == name);
    let school_col = find("學校").unwrap_or(0);
    let level_col = find("年級").unwrap_or(0);
    let status_col = find("狀態").unwrap_or(0);
    let name_col = find("學生姓名").unwrap_or(0);
    let parent_col = find("家長 Email").unwrap_or(0);
    let teacher_col = find(TEACHER_EMAIL_COL);

    let cell = |row: &Vec<String>, col: usize| -> String {
        row.get(col).map(|s| s.trim().to_string()).unwrap_or_default()
    };

    let mut rows = Vec::new();
    for raw in values.iter().skip(1) {
        let name = cell(raw, name_col);
        if name.is_empty() {
            continue;
        }
        rows.push(StudentRow {
            school: cell(raw, school_col),
            level: cell(raw, level_col),
            active: cell(raw, status_col) == "Y",
            name,
            parent_email: cell(raw, parent_col),
            teacher_email: teacher_col
                .map(|c| cell(raw, c))
                .filter(|s| !s.is_empty()),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::sheets::CellUpdate;

    struct MemorySheet {
        values: Vec<Vec<String>>,
    }

    impl SheetStore for &MemorySheet {
        async fn fetch_values(&self, _sheet: &str) -> Result<Vec<Vec<String>>> {
            Ok(self.values.clone())
        }

        async fn batch_update(&self, _sheet: &str, _updates: &[CellUpdate]) -> Result<()> {
            Ok(())
        }
    }

    fn table() -> Vec<Vec<String>> {
        let header = vec!["學校", "年級", "狀態", "學生姓名", "家長 Email", "老師 Email"];
        let rows = vec![
            vec!["培正小學", "小三", "Y", "陳大文", "chan@example.com", "teacher@example.com"],
            vec!["培正小學", "小三", "N", "李小明", "lee@example.com", ""],
            vec!["培正小學", "小四", "Y", "王小華", "wong@example.com", "N/A"],
        ];
        std::iter::once(header)
            .chain(rows)
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_match_students_filters_school_level_and_active() {
        let sheet = MemorySheet { values: table() };
        let svc = StudentService::new(&sheet, &Config::default());
        let matched = svc.match_students("培正小學", "小三").await.unwrap();
        // 狀態 N 的李小明不参与
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "陳大文");
        assert_eq!(
            matched[0].teacher_email.as_deref(),
            Some("teacher@example.com")
        );
    }

    #[tokio::test]
    async fn test_missing_column_is_reported() {
        let mut values = table();
        values[0].remove(4);
        let sheet = MemorySheet { values };
        let svc = StudentService::new(&sheet, &Config::default());
        let err = svc.load_students().await.unwrap_err();
        let app_err = err.downcast_ref::<AppError>().unwrap();
        assert!(matches!(
            app_err,
            AppError::Sheet(SheetError::MissingColumns { .. })
        ));
    }
}
