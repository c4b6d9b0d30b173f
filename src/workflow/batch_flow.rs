//! 批次处理流程 - 流程层
//!
//! 核心职责：定义"一个批次"（学校 + 年级）的完整处理流程
//!
//! 流程顺序：
//! 1. 审批确认 → 构建题目清单
//! 2. 标记 Loaded 并写回选定句子
//! 3. 渲染（学生版 PDF / 教师版 PDF / 可编辑 FODT）
//! 4. 下载落盘，或逐学生寄送（无效地址跳过继续）
//! 5. 全部成功后标记 Sent

use anyhow::Result;
use tracing::{error, info, warn};

use crate::clients::mail::MailClient;
use crate::clients::sheets::SheetStore;
use crate::config::{Config, DeliveryMode};
use crate::models::question::Question;
use crate::models::review::{ReviewRow, Status};
use crate::render::fodt::build_fodt;
use crate::render::fonts::{resolve_font, FontResolution};
use crate::render::worksheet::{date_label, Variant, WorksheetRenderer};
use crate::services::distribution::{worksheet_file_name, DistributionService};
use crate::services::review_service::ReviewService;
use crate::services::student_service::StudentService;
use crate::utils::logging::truncate_text;
use crate::workflow::batch_ctx::BatchCtx;

/// 批次处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// 已逐学生寄出
    Sent { delivered: usize, skipped: usize },
    /// 已写入输出目录
    Downloaded { files: Vec<String> },
    /// 批次未处理
    Skipped { reason: String },
}

impl BatchOutcome {
    /// 日志摘要
    pub fn summary(&self) -> String {
        match self {
            BatchOutcome::Sent { delivered, skipped } => {
                format!("寄出 {} 份，跳过 {} 份", delivered, skipped)
            }
            BatchOutcome::Downloaded { files } => format!("生成 {} 个文件", files.len()),
            BatchOutcome::Skipped { reason } => format!("跳过（{}）", reason),
        }
    }
}

/// 批次处理流程
///
/// - 编排完整的批次处理流程
/// - 决定何时渲染、何时寄送、何时落盘
/// - 只依赖业务能力（services）
pub struct WorksheetFlow<'a, S: SheetStore, M: MailClient> {
    review: &'a ReviewService<S>,
    students: &'a StudentService<S>,
    distribution: &'a DistributionService<M>,
    config: &'a Config,
    renderer: WorksheetRenderer,
    font: FontResolution,
}

impl<'a, S: SheetStore, M: MailClient> WorksheetFlow<'a, S, M> {
    /// 创建新的批次处理流程（字体只解析一次）
    pub fn new(
        review: &'a ReviewService<S>,
        students: &'a StudentService<S>,
        distribution: &'a DistributionService<M>,
        config: &'a Config,
    ) -> Self {
        Self {
            review,
            students,
            distribution,
            config,
            renderer: WorksheetRenderer::default(),
            font: resolve_font(&config.font_paths),
        }
    }

    pub async fn run(&self, ctx: &BatchCtx, rows: &[ReviewRow]) -> Result<BatchOutcome> {
        let batch_rows = ctx.rows_in_batch(rows);
        if batch_rows.is_empty() {
            return Ok(BatchOutcome::Skipped {
                reason: "此學校/年級沒有待處理的詞語".to_string(),
            });
        }

        if !ctx.all_ready(rows) && !self.config.include_pending {
            warn!(
                "⚠️ {} · {} 仍有 AI 句子未審批，本批次跳过",
                ctx.school, ctx.level
            );
            return Ok(BatchOutcome::Skipped {
                reason: "仍有 AI 句子未審批".to_string(),
            });
        }

        let questions = ctx.build_questions(rows);
        info!(
            "[{} · {}] 📋 共 {} 个词语进入工作纸",
            ctx.school,
            ctx.level,
            questions.len()
        );
        if self.config.verbose_logging {
            for question in &questions {
                info!(
                    "  {} → {}",
                    question.word,
                    truncate_text(&question.content, 40)
                );
            }
        }

        // 先标记 Loaded 并写回选定句子，再开始生成
        let timestamps = ctx.timestamps(rows);
        let updates = ctx.sentence_updates(rows);
        self.review
            .mark_rows(&timestamps, Status::Loaded, Some(&updates))
            .await?;

        match self.config.delivery_mode {
            DeliveryMode::Download => self.run_download(ctx, &timestamps, &questions).await,
            DeliveryMode::Email => self.run_email(ctx, &timestamps, &questions).await,
        }
    }

    /// 下载模式：学生版 + 教师版 PDF 与可编辑 FODT 一并落盘
    async fn run_download(
        &self,
        ctx: &BatchCtx,
        timestamps: &[String],
        questions: &[Question],
    ) -> Result<BatchOutcome> {
        let dir = &self.config.output_dir;
        tokio::fs::create_dir_all(dir).await?;

        let mut files = Vec::new();
        let student_pdf = self.render_pdf(ctx, None, questions, Variant::Student)?;
        files.push(
            self.write_output(dir, &worksheet_file_name(&ctx.school, &ctx.level, None, "pdf"), &student_pdf)
                .await?,
        );

        let key_pdf = self.render_pdf(ctx, None, questions, Variant::AnswerKey)?;
        let key_name = format!(
            "{}_答案.pdf",
            worksheet_file_name(&ctx.school, &ctx.level, None, "pdf").trim_end_matches(".pdf")
        );
        files.push(self.write_output(dir, &key_name, &key_pdf).await?);

        let fodt = build_fodt(
            questions,
            Variant::Student,
            &self.renderer.title_text(&ctx.school, &ctx.level, None, Variant::Student),
            &date_label(),
        );
        files.push(
            self.write_output(
                dir,
                &worksheet_file_name(&ctx.school, &ctx.level, None, "fodt"),
                fodt.as_bytes(),
            )
            .await?,
        );

        // 文件既已生成，批次随即完成
        self.review.mark_rows(timestamps, Status::Sent, None).await?;

        Ok(BatchOutcome::Downloaded { files })
    }

    /// 寄送模式：逐学生渲染个人版并寄出，地址无效跳过继续
    async fn run_email(
        &self,
        ctx: &BatchCtx,
        timestamps: &[String],
        questions: &[Question],
    ) -> Result<BatchOutcome> {
        let matched = self.students.match_students(&ctx.school, &ctx.level).await?;
        if matched.is_empty() {
            warn!(
                "⚠️ 沒有符合 {} · {} 的學生（狀態 = Y）",
                ctx.school, ctx.level
            );
            let all = self.students.load_students().await?;
            let schools: Vec<&str> = all.iter().map(|s| s.school.as_str()).collect();
            info!("🔍 排查：學生資料中的學校 {:?}", dedup(schools));
            return Ok(BatchOutcome::Skipped {
                reason: "沒有符合此學校/年級的學生".to_string(),
            });
        }
        info!("✅ 找到 {} 位学生", matched.len());

        let mut delivered = 0;
        let mut skipped = 0;
        for student in &matched {
            let pdf = self.render_pdf(ctx, Some(&student.name), questions, Variant::Student)?;
            match self
                .distribution
                .send_worksheet(student, &ctx.school, &ctx.level, pdf)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    // 单个学生失败不影响其余学生
                    error!("❌ {} 寄送失败: {}", student.name, e);
                    skipped += 1;
                }
            }
        }

        // 全员寄出才算批次完成
        if delivered == matched.len() {
            self.review.mark_rows(timestamps, Status::Sent, None).await?;
        }

        Ok(BatchOutcome::Sent { delivered, skipped })
    }

    fn render_pdf(
        &self,
        ctx: &BatchCtx,
        student: Option<&str>,
        questions: &[Question],
        variant: Variant,
    ) -> Result<Vec<u8>> {
        Ok(crate::render::render_to_bytes(
            &ctx.school,
            &ctx.level,
            student,
            questions,
            variant,
            &self.font,
        )?)
    }

    async fn write_output(&self, dir: &str, name: &str, data: &[u8]) -> Result<String> {
        let path = format!("{}/{}", dir.trim_end_matches('/'), name);
        tokio::fs::write(&path, data).await?;
        info!("📥 已生成 {}", path);
        Ok(path)
    }
}

fn dedup(mut items: Vec<&str>) -> Vec<&str> {
    items.sort_unstable();
    items.dedup();
    items
}
