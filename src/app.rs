//! 应用编排层
//!
//! 读取审核表、按学校/年级分批，逐批执行工作纸流程。

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{error, info};

use crate::clients::mail::SendGridClient;
use crate::clients::sheets::GoogleSheetsClient;
use crate::config::{Config, DeliveryMode};
use crate::models::review::ReviewRow;
use crate::services::distribution::DistributionService;
use crate::services::review_service::ReviewService;
use crate::services::student_service::StudentService;
use crate::utils::logging;
use crate::workflow::{BatchCtx, BatchOutcome, WorksheetFlow};

/// 应用主结构
pub struct App {
    config: Config,
    review: ReviewService<GoogleSheetsClient>,
    students: StudentService<GoogleSheetsClient>,
    distribution: DistributionService<SendGridClient>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.require_credentials()?;

        let sheets = GoogleSheetsClient::new(&config);
        let review = ReviewService::new(sheets.clone(), &config);
        let students = StudentService::new(sheets, &config);
        let distribution = DistributionService::new(SendGridClient::new(&config));

        Ok(Self {
            config,
            review,
            students,
            distribution,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let mode = match self.config.delivery_mode {
            DeliveryMode::Download => "預覽 & 下載",
            DeliveryMode::Email => "按學生寄送",
        };
        logging::log_startup(mode);

        let rows = self
            .review
            .list_pending(self.config.level_filter.as_deref())
            .await?;
        let rows: Vec<ReviewRow> = rows
            .into_iter()
            .filter(|r| {
                self.config
                    .school_filter
                    .as_deref()
                    .map(|s| r.school == s)
                    .unwrap_or(true)
            })
            .collect();

        if rows.is_empty() {
            info!("🎉 目前沒有待處理的詞語。所有資料已發送或正在處理中。");
            return Ok(());
        }

        let batches: BTreeSet<(String, String)> = rows.iter().map(|r| r.batch_key()).collect();
        logging::log_batches_loaded(batches.len());

        let flow = WorksheetFlow::new(
            &self.review,
            &self.students,
            &self.distribution,
            &self.config,
        );

        let mut success = 0;
        let mut skipped = 0;
        for (i, (school, level)) in batches.iter().enumerate() {
            logging::log_batch_start(i + 1, batches.len(), school, level);

            let ctx = BatchCtx::new(school.clone(), level.clone());
            match flow.run(&ctx, &rows).await {
                Ok(outcome) => {
                    logging::log_batch_complete(i + 1, &outcome.summary());
                    if matches!(outcome, BatchOutcome::Skipped { .. }) {
                        skipped += 1;
                    } else {
                        success += 1;
                    }
                }
                Err(e) => {
                    error!("❌ 批次 {} · {} 处理失败: {}", school, level, e);
                    skipped += 1;
                }
            }
        }

        logging::print_final_stats(success, skipped, batches.len());
        Ok(())
    }
}
