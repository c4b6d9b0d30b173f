use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 表格读写错误
    Sheet(SheetError),
    /// 渲染错误
    Render(RenderError),
    /// 邮件发送错误
    Mail(MailError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Sheet(e) => write!(f, "表格错误: {}", e),
            AppError::Render(e) => write!(f, "渲染错误: {}", e),
            AppError::Mail(e) => write!(f, "邮件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Sheet(e) => Some(e),
            AppError::Render(e) => Some(e),
            AppError::Mail(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 表格读写错误
#[derive(Debug)]
pub enum SheetError {
    /// 网络请求失败
    RequestFailed {
        sheet: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    BadResponse {
        sheet: String,
        status: u16,
        message: String,
    },
    /// 工作表为空
    EmptySheet {
        sheet: String,
    },
    /// 缺少必要栏位（附上实际读到的栏位，方便排查）
    MissingColumns {
        sheet: String,
        missing: Vec<String>,
        found: Vec<String>,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::RequestFailed { sheet, source } => {
                write!(f, "请求工作表 {} 失败: {}", sheet, source)
            }
            SheetError::BadResponse {
                sheet,
                status,
                message,
            } => {
                write!(
                    f,
                    "工作表 {} 返回错误响应: HTTP {} {}",
                    sheet, status, message
                )
            }
            SheetError::EmptySheet { sheet } => write!(f, "工作表 {} 没有资料", sheet),
            SheetError::MissingColumns {
                sheet,
                missing,
                found,
            } => {
                write!(
                    f,
                    "工作表 {} 缺少栏位 {:?}，实际栏位: {:?}",
                    sheet, missing, found
                )
            }
            SheetError::JsonParseFailed { source } => write!(f, "JSON解析失败: {}", source),
        }
    }
}

impl std::error::Error for SheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SheetError::RequestFailed { source, .. } | SheetError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 渲染错误
#[derive(Debug)]
pub enum RenderError {
    /// PDF 写出失败
    PdfWriteFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 字体注册失败
    FontRegisterFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 输出文件写入失败
    OutputWriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::PdfWriteFailed { source } => write!(f, "PDF 写出失败: {}", source),
            RenderError::FontRegisterFailed { path, source } => {
                write!(f, "字体注册失败 ({}): {}", path, source)
            }
            RenderError::OutputWriteFailed { path, source } => {
                write!(f, "输出文件写入失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::PdfWriteFailed { source }
            | RenderError::FontRegisterFailed { source, .. }
            | RenderError::OutputWriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 邮件发送错误
#[derive(Debug)]
pub enum MailError {
    /// 收件地址格式无效
    InvalidRecipient {
        address: String,
    },
    /// 网络请求失败
    RequestFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 邮件服务返回错误响应
    SendFailed {
        status: u16,
        body: String,
    },
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::InvalidRecipient { address } => {
                write!(f, "無效電郵格式: '{}'", address)
            }
            MailError::RequestFailed { source } => write!(f, "邮件请求失败: {}", source),
            MailError::SendFailed { status, body } => {
                write!(f, "邮件发送失败: HTTP {} {}", status, body)
            }
        }
    }
}

impl std::error::Error for MailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MailError::RequestFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件读取失败
    FileReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 缺少必要配置项
    MissingField {
        field: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileReadFailed { path, source } => {
                write!(f, "配置文件读取失败 ({}): {}", path, source)
            }
            ConfigError::TomlParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
            ConfigError::MissingField { field } => write!(f, "缺少必要配置项: {}", field),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileReadFailed { source, .. }
            | ConfigError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Sheet(SheetError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Render(RenderError::OutputWriteFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建工作表请求错误
    pub fn sheet_request_failed(
        sheet: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Sheet(SheetError::RequestFailed {
            sheet: sheet.into(),
            source: Box::new(source),
        })
    }

    /// 创建缺少栏位错误
    pub fn missing_columns(
        sheet: impl Into<String>,
        missing: Vec<String>,
        found: Vec<String>,
    ) -> Self {
        AppError::Sheet(SheetError::MissingColumns {
            sheet: sheet.into(),
            missing,
            found,
        })
    }

    /// 创建无效收件地址错误
    pub fn invalid_recipient(address: impl Into<String>) -> Self {
        AppError::Mail(MailError::InvalidRecipient {
            address: address.into(),
        })
    }

    /// 创建邮件发送失败错误
    pub fn mail_send_failed(status: u16, body: impl Into<String>) -> Self {
        AppError::Mail(MailError::SendFailed {
            status,
            body: body.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
