use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::rubric::{self, RubricDimension};

/// 1-5 分的有效分数
///
/// 只能通过 `Score::new` 构造，超出范围的值拿不到 `Score`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// 单个维度的评分
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grade {
    /// 有效分数
    Scored(Score),
    /// 未评分（调用失败或响应无法解析），带原因
    Ungraded { reason: String },
}

impl Grade {
    pub fn ungraded(reason: impl Into<String>) -> Self {
        Grade::Ungraded {
            reason: reason.into(),
        }
    }

    /// 数值分数，未评分返回 `None`
    pub fn score(&self) -> Option<u8> {
        match self {
            Grade::Scored(score) => Some(score.get()),
            Grade::Ungraded { .. } => None,
        }
    }

    pub fn is_ungraded(&self) -> bool {
        matches!(self, Grade::Ungraded { .. })
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Scored(score) => write!(f, "{}", score.get()),
            Grade::Ungraded { .. } => write!(f, "N/A"),
        }
    }
}

/// 单个维度的评分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionResult {
    /// 维度标识
    pub dimension: &'static str,
    pub grade: Grade,
    pub comments: String,
}

impl DimensionResult {
    pub fn scored(dimension: &RubricDimension, score: Score, comments: impl Into<String>) -> Self {
        Self {
            dimension: dimension.key,
            grade: Grade::Scored(score),
            comments: comments.into(),
        }
    }

    /// 未评分结果，评语即失败原因
    pub fn ungraded(dimension: &RubricDimension, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            dimension: dimension.key,
            grade: Grade::ungraded(reason.clone()),
            comments: reason,
        }
    }

    /// 转换为入库 / 对外返回的记录格式
    pub fn to_record(&self) -> GradeRecord {
        GradeRecord {
            grade_type: self.dimension.to_string(),
            grade: self.grade.score(),
            comments: self.comments.clone(),
        }
    }
}

/// 评分记录 `{type, grade, comments}`
///
/// 字段名是下游看板依赖的契约；`grade` 为 `null` 表示未评分。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRecord {
    #[serde(rename = "type")]
    pub grade_type: String,
    pub grade: Option<u8>,
    pub comments: String,
}

impl GradeRecord {
    /// 还原为 `Grade`，库里的非法值同样视为未评分
    pub fn grade(&self) -> Grade {
        match self.grade.and_then(|g| Score::new(g as i64)) {
            Some(score) => Grade::Scored(score),
            None => Grade::ungraded(self.comments.clone()),
        }
    }
}

/// 一篇作文的完整评分报告
///
/// 每个目录维度恰好一条，按目录顺序排列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingReport {
    results: Vec<DimensionResult>,
}

impl GradingReport {
    /// 由编排层组装；`results` 必须与目录一一对应
    pub(crate) fn from_ordered(results: Vec<DimensionResult>) -> Self {
        debug_assert_eq!(results.len(), rubric::catalog().len());
        debug_assert!(results
            .iter()
            .zip(rubric::catalog())
            .all(|(r, d)| r.dimension == d.key));
        Self { results }
    }

    pub fn results(&self) -> &[DimensionResult] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DimensionResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, dimension: &str) -> Option<&DimensionResult> {
        self.results.iter().find(|r| r.dimension == dimension)
    }

    pub fn ungraded_count(&self) -> usize {
        self.results.iter().filter(|r| r.grade.is_ungraded()).count()
    }

    pub fn to_records(&self) -> Vec<GradeRecord> {
        self.results.iter().map(DimensionResult::to_record).collect()
    }
}

impl<'a> IntoIterator for &'a GradingReport {
    type Item = &'a DimensionResult;
    type IntoIter = std::slice::Iter<'a, DimensionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// 按目录顺序渲染成文本表格
impl fmt::Display for GradingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<18} {:>5}  {}", "Dimension", "Grade", "Comments")?;
        writeln!(f, "{}", "─".repeat(60))?;
        for result in &self.results {
            let name = rubric::find_dimension(result.dimension)
                .map(|d| d.display_name)
                .unwrap_or(result.dimension);
            writeln!(
                f,
                "{:<18} {:>5}  {}",
                name,
                result.grade.to_string(),
                crate::utils::logging::truncate_text(&result.comments, 60)
            )?;
        }
        Ok(())
    }
}
