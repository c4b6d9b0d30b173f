//! 试算表客户端
//!
//! 封装所有与 Sheets REST API 相关的调用逻辑；
//! 服务层通过 [`SheetStore`] 访问，测试可换成内存实现。

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, SheetError};

/// 单格写回
#[derive(Debug, Clone)]
pub struct CellUpdate {
    /// 工作表内的 A1 位置，例如 "G5"
    pub range: String,
    pub value: String,
}

/// 表格存取能力
#[allow(async_fn_in_trait)]
pub trait SheetStore {
    /// 读取整张工作表（首行为表头）
    async fn fetch_values(&self, sheet: &str) -> Result<Vec<Vec<String>>>;

    /// 一次批量写回若干单元格
    async fn batch_update(&self, sheet: &str, updates: &[CellUpdate]) -> Result<()>;
}

/// 把列号转成 A1 记法的列字母（表格只有个位数栏）
pub fn column_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Google Sheets REST 客户端
#[derive(Clone)]
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    token: String,
}

impl GoogleSheetsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.sheets_api_base_url.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            token: config.sheets_api_token.clone(),
        }
    }

    fn values_url(&self, sheet: &str, suffix: Option<&str>) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| AppError::Other(format!("无效的 API 地址: {}", e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::Other("无效的 API 地址".to_string()))?;
            segments.push("v4");
            segments.push("spreadsheets");
            segments.push(&self.spreadsheet_id);
            match suffix {
                // values:batchUpdate 形式
                Some(s) => {
                    segments.push(s);
                }
                None => {
                    segments.push("values");
                    segments.push(sheet);
                }
            }
        }
        Ok(url)
    }
}

impl SheetStore for GoogleSheetsClient {
    async fn fetch_values(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        debug!("读取工作表: {}", sheet);
        let url = self.values_url(sheet, None)?;

        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await
            .map_err(|e| AppError::sheet_request_failed(sheet, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AppError::Sheet(SheetError::BadResponse {
                sheet: sheet.to_string(),
                status: status.as_u16(),
                message,
            })
            .into());
        }

        let range: ValueRange = resp
            .json()
            .await
            .map_err(|e| AppError::sheet_request_failed(sheet, e))?;

        Ok(range
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    async fn batch_update(&self, sheet: &str, updates: &[CellUpdate]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        debug!("批量写回 {} 个单元格到 {}", updates.len(), sheet);

        let url = self.values_url(sheet, Some("values:batchUpdate"))?;
        let data: Vec<Value> = updates
            .iter()
            .map(|u| {
                json!({
                    "range": format!("{}!{}", sheet, u.range),
                    "values": [[u.value]],
                })
            })
            .collect();
        let body = json!({
            "valueInputOption": "RAW",
            "data": data,
        });

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::sheet_request_failed(sheet, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AppError::Sheet(SheetError::BadResponse {
                sheet: sheet.to_string(),
                status: status.as_u16(),
                message,
            })
            .into());
        }
        Ok(())
    }
}
