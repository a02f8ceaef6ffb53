//! 投稿处理流程 - 流程层
//!
//! 核心职责：定义"一份投稿"的完整处理流程
//!
//! 流程顺序：
//! 1. 每张图片 → 文字识别（任一失败则整份投稿失败，不评分）
//! 2. 按上传顺序以空格拼接成作文
//! 3. 作文 → 六个维度评分（只调用一次评分流程）
//! 4. 作文 + 图片 + 评分 → 一次性入库

use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info};

use crate::clients::{LlmClient, LlmProvider};
use crate::config::Config;
use crate::error::{AppResult, ExtractionError};
use crate::infrastructure::EssayStore;
use crate::models::submission::{
    join_essay_text, submission_timestamp, ImageUpload, NewSubmission, SubmissionOutcome,
    SubmissionRequest,
};
use crate::services::TextExtractor;
use crate::utils::truncate_text;
use crate::workflow::grading_flow::GradingFlow;
use crate::workflow::submission_ctx::SubmissionCtx;

/// 投稿处理流程
///
/// - 编排识别 → 拼接 → 评分 → 入库
/// - 不持有数据库连接，存储由调用方按次传入
/// - 只依赖业务能力（services）
pub struct SubmissionFlow {
    extractor: TextExtractor,
    grading: GradingFlow,
}

impl SubmissionFlow {
    /// 使用配置中的模型创建流程
    pub fn new(config: &Config) -> Self {
        Self::with_providers(
            Arc::new(LlmClient::for_vision(config)),
            Arc::new(LlmClient::for_grading(config)),
        )
    }

    /// 使用指定的识别 / 评分服务创建流程
    pub fn with_providers(vision: Arc<dyn LlmProvider>, grading: Arc<dyn LlmProvider>) -> Self {
        Self {
            extractor: TextExtractor::new(vision),
            grading: GradingFlow::new(grading),
        }
    }

    pub fn grading(&self) -> &GradingFlow {
        &self.grading
    }

    /// 处理一份投稿
    pub async fn submit(
        &self,
        store: &dyn EssayStore,
        request: SubmissionRequest,
        ctx: &SubmissionCtx,
    ) -> AppResult<SubmissionOutcome> {
        info!("{} 🔍 正在识别 {} 张图片...", ctx, request.images.len());
        let texts = self.extract_texts(&request.images).await.map_err(|e| {
            error!("{} ❌ 图片 {} 识别失败，放弃评分", ctx, e.filename());
            e
        })?;

        let essay_text = join_essay_text(&texts);
        info!("{} 作文: {}", ctx, truncate_text(&essay_text, 80));

        info!("{} 📝 正在按 6 个维度评分...", ctx);
        let report = self.grading.grade_essay(&essay_text).await;

        let submission = NewSubmission {
            authorname: request.authorname,
            title: request.title,
            text: essay_text,
            date_submitted: submission_timestamp(),
            image_paths: request.images.into_iter().map(|img| img.filename).collect(),
            grades: report.to_records(),
        };

        let essay_id = store.save_submission(&submission).await.map_err(|e| {
            error!("{} ❌ 入库失败 (阶段: {}): {}", ctx, e.stage, e);
            e
        })?;
        info!("{} ✓ 已入库，作文 ID: {}", ctx, essay_id);

        Ok(SubmissionOutcome {
            essay_id,
            text: submission.text,
            grades: submission.grades,
            report,
        })
    }

    /// 并发识别全部图片，结果保持上传顺序
    ///
    /// 有失败时返回上传顺序中第一个失败的图片。
    pub async fn extract_texts(&self, images: &[ImageUpload]) -> Result<Vec<String>, ExtractionError> {
        join_all(images.iter().map(|image| self.extractor.extract_text(image)))
            .await
            .into_iter()
            .collect()
    }
}
