//! # Worksheet Admin
//!
//! 一个用于生成与寄送校本填充工作纸的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础层（Layout / Render）
//! - `layout/` - 行内标记排版引擎：切词、贪婪断行、分页游标
//! - `render/` - 画布抽象与 PDF / FODT 后端、字体解析
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单张表或单封邮件
//! - `ReviewService` - 审核表读取、校验、状态写回能力
//! - `StudentService` - 学生资料匹配能力
//! - `DistributionService` - 单个学生的寄送能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个批次"的完整处理流程
//! - `BatchCtx` - 上下文封装（学校 + 年级 + 选定句子）
//! - `WorksheetFlow` - 流程编排（审批 → 渲染 → 寄送/落盘 → 写回）
//!
//! ### ④ 编排层（App）
//! - `app` - 分批调度、统计与日志
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod layout;
pub mod logger;
pub mod models;
pub mod render;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, DeliveryMode};
pub use error::{AppError, AppResult};
pub use layout::{tokenize, LayoutCursor, PageMetrics, Token};
pub use models::{Question, ReviewRow, Source, Status, StudentRow};
pub use render::{Variant, WorksheetRenderer};
pub use workflow::{BatchCtx, BatchOutcome, WorksheetFlow};
