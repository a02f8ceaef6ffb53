//! 作文评分流程 - 流程层
//!
//! 一篇作文 × 目录中的每个维度 → 一份完整报告。
//! 六次调用并发发出，结果按目录下标收集，与完成先后无关。

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::LlmProvider;
use crate::models::grade::GradingReport;
use crate::models::rubric;
use crate::services::DimensionGrader;

/// 作文评分流程
///
/// - 每个维度独立评分，一个维度失败不影响其他维度
/// - 报告总是包含目录中的全部维度，顺序固定
/// - 不持有任何可变状态，可重复调用
pub struct GradingFlow {
    grader: DimensionGrader,
}

impl GradingFlow {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            grader: DimensionGrader::new(provider),
        }
    }

    /// 对一篇作文按全部维度评分
    pub async fn grade_essay(&self, essay_text: &str) -> GradingReport {
        let catalog = rubric::catalog();
        debug!(
            "开始评分: {} 个维度, 作文长度 {} 字符",
            catalog.len(),
            essay_text.chars().count()
        );

        let results = join_all(
            catalog
                .iter()
                .map(|dimension| self.grader.grade(essay_text, dimension)),
        )
        .await;

        let report = GradingReport::from_ordered(results);
        info!(
            "✓ 评分完成: {}/{} 个维度有效",
            report.len() - report.ungraded_count(),
            report.len()
        );
        report
    }
}
