//! 批量投稿处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量投稿的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志头、打开数据库、创建处理流程
//! 2. **批量加载**：扫描并加载所有待处理的投稿清单（`Vec<SubmissionManifest>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将投稿分批次处理，每批完成后再开始下一批
//! 5. **资源管理**：持有数据库存储，按次借给流程使用
//! 6. **全局统计**：汇总所有投稿的处理结果
//!
//! 设置了 `report_author` 时只打印该作者的历史评分。

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{EssayStore, SqliteEssayStore};
use crate::models::grade::GradeRecord;
use crate::models::rubric;
use crate::models::submission::SubmissionManifest;
use crate::orchestrator::submission_processor;
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_startup, log_submissions_loaded,
    print_final_stats, truncate_text,
};
use crate::workflow::SubmissionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    store: Arc<dyn EssayStore>,
    flow: Arc<SubmissionFlow>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;

        log_startup(
            config.max_concurrent_submissions,
            &config.grading_model_name,
            &config.vision_model_name,
        );

        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 OPENAI_API_KEY / LLM_API_KEY，外部调用将会失败");
        }

        let store = SqliteEssayStore::open(&config.database_path)?;
        let flow = SubmissionFlow::new(&config);

        Ok(Self::with_parts(config, Arc::new(store), Arc::new(flow)))
    }

    /// 使用已创建的存储和流程组装应用
    pub fn with_parts(config: Config, store: Arc<dyn EssayStore>, flow: Arc<SubmissionFlow>) -> Self {
        Self {
            config,
            store,
            flow,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        if let Some(authorname) = &self.config.report_author {
            self.print_author_report(authorname).await?;
            return Ok(ProcessingStats::default());
        }

        let all_submissions = self.load_submissions().await?;

        if all_submissions.is_empty() {
            warn!("⚠️ 没有找到待处理的投稿清单，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_submissions_loaded(all_submissions.len(), self.config.max_concurrent_submissions);

        let stats = self.process_all_submissions(all_submissions).await?;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );
        self.print_roster().await;

        Ok(stats)
    }

    /// 加载投稿清单
    async fn load_submissions(&self) -> Result<Vec<SubmissionManifest>> {
        info!("\n📁 正在扫描待处理的投稿...");
        Ok(crate::models::load_all_manifests(&self.config.submissions_folder).await?)
    }

    /// 处理所有投稿
    async fn process_all_submissions(
        &self,
        all_submissions: Vec<SubmissionManifest>,
    ) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_submissions.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = all_submissions.len();
        let total_batches = total.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        for (batch_idx, batch) in all_submissions.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            let batch_num = batch_idx + 1;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            let batch_result = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[SubmissionManifest],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        for (idx, manifest) in batch.iter().enumerate() {
            let submission_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let flow = self.flow.clone();
            let store = self.store.clone();
            let manifest = manifest.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                submission_processor::process_submission(
                    &flow,
                    store.as_ref(),
                    manifest,
                    submission_index,
                )
                .await
            });
            batch_handles.push((submission_index, handle));
        }

        let mut result = BatchResult::default();

        for (submission_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(_)) => {
                    result.success += 1;
                }
                Ok(Err(e)) => {
                    log_submission_error(submission_index, &e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[投稿 #{}] 任务执行失败: {}", submission_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }

    /// 打印某个作者的全部作文和评分
    async fn print_author_report(&self, authorname: &str) -> Result<()> {
        let essays = match self.store.author_grades(authorname).await {
            Ok(essays) => essays,
            Err(AppError::NotFound(e)) => {
                warn!("⚠️ {}", e);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        info!("{}", "=".repeat(60));
        info!("📚 作者 {} 共 {} 篇作文", authorname, essays.len());
        for essay in &essays {
            info!("\n#{} 《{}》 提交于 {}", essay.id, essay.title, essay.date_submitted);
            info!("图片: {}", essay.images.join(", "));
            info!("正文: {}", truncate_text(&essay.text, 80));
            for grade in &essay.grades {
                log_grade_row(grade);
            }
        }
        info!("{}", "=".repeat(60));
        Ok(())
    }

    /// 打印作者名册
    async fn print_roster(&self) {
        match self.store.list_authors().await {
            Ok(authors) => {
                info!("👥 数据库中共有 {} 位作者", authors.len());
                for author in authors {
                    info!("  {} - {} 篇作文", author.authorname, author.essays.len());
                }
            }
            Err(e) => warn!("⚠️ 无法读取作者列表: {}", e),
        }
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

// ========== 日志辅助函数 ==========

fn log_submission_error(submission_index: usize, e: &AppError) {
    match e {
        AppError::Extraction(inner) => error!(
            "[投稿 #{}] ❌ 图片 {} 处理失败: {}",
            submission_index,
            inner.filename(),
            inner
        ),
        AppError::Persistence(inner) => error!(
            "[投稿 #{}] ❌ 入库失败 (阶段: {}): {}",
            submission_index, inner.stage, inner
        ),
        other => error!("[投稿 #{}] ❌ 处理过程中发生错误: {}", submission_index, other),
    }
}

fn log_grade_row(grade: &GradeRecord) {
    let name = rubric::find_dimension(&grade.grade_type)
        .map(|d| d.display_name)
        .unwrap_or(grade.grade_type.as_str());
    info!(
        "  {:<18} {:>5}  {}",
        name,
        grade.grade().to_string(),
        truncate_text(&grade.comments, 60)
    );
}
