use crate::error::{AppError, ConfigError};
use serde::Deserialize;

/// 发送模式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// 生成文件写入输出目录
    Download,
    /// 按学生寄送给家长
    Email,
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google 试算表 ID
    pub spreadsheet_id: String,
    /// Sheets API 基础地址
    pub sheets_api_base_url: String,
    /// Sheets API 访问令牌（由密钥库注入）
    pub sheets_api_token: String,
    /// 审核工作表名称
    pub review_sheet: String,
    /// 学生资料工作表名称
    pub students_sheet: String,
    /// 读取缓存有效期（秒）
    pub cache_ttl_secs: u64,
    /// 邮件 API 基础地址
    pub mail_api_base_url: String,
    /// 邮件 API 密钥
    pub mail_api_key: String,
    /// 寄件人地址
    pub from_email: String,
    /// 寄件人显示名称
    pub from_name: String,
    /// 中文字体候选路径，按顺序尝试
    pub font_paths: Vec<String>,
    /// 生成文件输出目录
    pub output_dir: String,
    /// 发送模式
    pub delivery_mode: DeliveryMode,
    /// 只处理指定学校（留空则处理全部）
    pub school_filter: Option<String>,
    /// 只处理指定年级（留空则处理全部）
    pub level_filter: Option<String>,
    /// 是否允许处理仍含未审批 AI 句子的批次
    pub include_pending: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheets_api_base_url: "https://sheets.googleapis.com".to_string(),
            sheets_api_token: String::new(),
            review_sheet: "Review".to_string(),
            students_sheet: "學生資料".to_string(),
            cache_ttl_secs: 30,
            mail_api_base_url: "https://api.sendgrid.com".to_string(),
            mail_api_key: String::new(),
            from_email: "worksheet@example.com".to_string(),
            from_name: "自動發送系統".to_string(),
            font_paths: vec![
                "Kai.ttf".to_string(),
                "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc".to_string(),
                "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf".to_string(),
            ],
            output_dir: "output_pdf".to_string(),
            delivery_mode: DeliveryMode::Download,
            school_filter: None,
            level_filter: None,
            include_pending: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            spreadsheet_id: std::env::var("SPREADSHEET_ID").unwrap_or(default.spreadsheet_id),
            sheets_api_base_url: std::env::var("SHEETS_API_BASE_URL").unwrap_or(default.sheets_api_base_url),
            sheets_api_token: std::env::var("SHEETS_API_TOKEN").unwrap_or(default.sheets_api_token),
            review_sheet: std::env::var("REVIEW_SHEET").unwrap_or(default.review_sheet),
            students_sheet: std::env::var("STUDENTS_SHEET").unwrap_or(default.students_sheet),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.cache_ttl_secs),
            mail_api_base_url: std::env::var("MAIL_API_BASE_URL").unwrap_or(default.mail_api_base_url),
            mail_api_key: std::env::var("MAIL_API_KEY").unwrap_or(default.mail_api_key),
            from_email: std::env::var("FROM_EMAIL").unwrap_or(default.from_email),
            from_name: std::env::var("FROM_NAME").unwrap_or(default.from_name),
            font_paths: std::env::var("FONT_PATHS").ok().map(|v| v.split(':').map(str::to_string).collect()).unwrap_or(default.font_paths),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            delivery_mode: std::env::var("DELIVERY_MODE").ok().and_then(|v| match v.to_lowercase().as_str() {
                "email" => Some(DeliveryMode::Email),
                "download" => Some(DeliveryMode::Download),
                _ => None,
            }).unwrap_or(default.delivery_mode),
            school_filter: std::env::var("SCHOOL_FILTER").ok().filter(|v| !v.is_empty()),
            level_filter: std::env::var("LEVEL_FILTER").ok().filter(|v| !v.is_empty()),
            include_pending: std::env::var("INCLUDE_PENDING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.include_pending),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 密钥文件加载配置
    pub fn from_file(path: &str) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(ConfigError::FileReadFailed {
                path: path.to_string(),
                source: Box::new(e),
            })
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: path.to_string(),
                source: Box::new(e),
            })
        })?;
        Ok(config)
    }

    /// 校验必要配置项（仅在真正连线时需要）
    pub fn require_credentials(&self) -> Result<(), AppError> {
        if self.spreadsheet_id.is_empty() {
            return Err(AppError::Config(ConfigError::MissingField {
                field: "spreadsheet_id".to_string(),
            }));
        }
        if self.sheets_api_token.is_empty() {
            return Err(AppError::Config(ConfigError::MissingField {
                field: "sheets_api_token".to_string(),
            }));
        }
        Ok(())
    }
}
