//! 中文字体解析
//!
//! 按顺序尝试一组字体提供者，第一个命中的字体以内嵌方式使用。
//! 全部落空时退回 PDF 内建字形集并发出结构化警告，渲染照常
//! 进行，只是中文字形可能缺失（画质降级，而非错误）。

use tracing::{info, warn};

/// 单个提供者的查找结果
#[derive(Debug)]
pub enum FontLookup {
    Found(Vec<u8>),
    NotFound,
}

/// 字体提供者：尝试取得一份字体数据
pub trait FontProvider {
    fn lookup(&self) -> FontLookup;

    /// 供日志显示的来源描述
    fn describe(&self) -> String;
}

/// 从文件路径读取字体
pub struct FileFontProvider {
    path: String,
}

impl FileFontProvider {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl FontProvider for FileFontProvider {
    fn lookup(&self) -> FontLookup {
        match std::fs::read(&self.path) {
            Ok(data) if !data.is_empty() => FontLookup::Found(data),
            _ => FontLookup::NotFound,
        }
    }

    fn describe(&self) -> String {
        self.path.clone()
    }
}

/// 最终选定的字体
#[derive(Debug, Clone)]
pub enum FontResolution {
    /// 内嵌外部字体
    Embedded { source: String, data: Vec<u8> },
    /// 内建字形集（降级）
    Builtin,
}

impl FontResolution {
    pub fn is_degraded(&self) -> bool {
        matches!(self, FontResolution::Builtin)
    }
}

/// 依序尝试候选路径，返回选定字体
pub fn resolve_font(paths: &[String]) -> FontResolution {
    let providers: Vec<FileFontProvider> = paths
        .iter()
        .map(|p| FileFontProvider::new(p.clone()))
        .collect();
    resolve_from_providers(&providers)
}

fn resolve_from_providers<P: FontProvider>(providers: &[P]) -> FontResolution {
    for provider in providers {
        match provider.lookup() {
            FontLookup::Found(data) => {
                info!("✓ 字体已载入: {}", provider.describe());
                return FontResolution::Embedded {
                    source: provider.describe(),
                    data,
                };
            }
            FontLookup::NotFound => continue,
        }
    }
    warn!("⚠️ 找不到中文字体，退回内建字形集，中文字形可能缺失");
    FontResolution::Builtin
}
