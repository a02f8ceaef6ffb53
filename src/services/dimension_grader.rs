//! 单维度评分服务 - 业务能力层
//!
//! 只负责"按一个维度给一篇作文打分"，不关心其他维度和流程。
//! 任何失败（调用失败、响应无法解析、分数越界）都变成未评分结果，不向上抛错。

use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, warn};

use crate::clients::{ChatRequest, LlmProvider};
use crate::models::grade::{DimensionResult, Score};
use crate::models::rubric::RubricDimension;

/// 评分失败的原因
///
/// `Display` 文本会作为未评分结果的评语入库，给看板展示。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradingFailure {
    #[error("grading service call failed: {0}")]
    Provider(String),
    #[error("response could not be parsed")]
    Unparseable,
    #[error("response is missing the '{0}' field")]
    MissingField(&'static str),
    #[error("grade {0} is not a whole number from 1 to 5")]
    InvalidGrade(String),
}

/// 单维度评分服务
pub struct DimensionGrader {
    provider: Arc<dyn LlmProvider>,
}

impl DimensionGrader {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// 按给定维度评分，总是返回结果
    ///
    /// 作文文本原样提交（可能为空或是识别噪声）。只调用一次服务，不重试。
    pub async fn grade(&self, essay_text: &str, dimension: &RubricDimension) -> DimensionResult {
        let request = build_grading_request(essay_text, dimension);

        let failure = match self.provider.chat(&request).await {
            Ok(raw) => match parse_grading_response(&raw) {
                Ok((score, comments)) => {
                    debug!("维度 {} 评分: {}", dimension.key, score.get());
                    return DimensionResult::scored(dimension, score, comments);
                }
                Err(failure) => {
                    debug!(
                        "维度 {} 原始响应: {}",
                        dimension.key,
                        crate::utils::truncate_text(&raw, 200)
                    );
                    failure
                }
            },
            Err(e) => GradingFailure::Provider(e.to_string()),
        };

        warn!("⚠️ 维度 {} 未评分: {}", dimension.key, failure);
        DimensionResult::ungraded(dimension, failure.to_string())
    }
}

/// 构建评分请求：评分说明作为系统消息，作文作为用户消息
pub fn build_grading_request(essay_text: &str, dimension: &RubricDimension) -> ChatRequest {
    let user_message = format!(
        "Here is the essay to be graded:\n\n{}\n\n\
         Provide a structured JSON response with 'grade' (a whole number from 1 to 5) \
         and 'comments' (a string) as keys.",
        essay_text
    );

    ChatRequest::new(user_message)
        .with_system(dimension.instructions)
        .json_object()
        .with_temperature(0.0)
}

/// 解析评分响应 `{"grade": .., "comments": ".."}`
///
/// 接受的分数：1-5 的整数、小数部分为 0 的数字、内容是这样整数的字符串。
/// 其余一律视为无效，不截断到范围内。
/// 评语不是字符串时（对象、数组等）展开成文本，分数照常保留。
pub fn parse_grading_response(raw: &str) -> Result<(Score, String), GradingFailure> {
    let body = strip_code_fence(raw);

    let value: JsonValue = serde_json::from_str(body).map_err(|_| GradingFailure::Unparseable)?;
    let object = value.as_object().ok_or(GradingFailure::Unparseable)?;

    let grade = match object.get("grade") {
        None | Some(JsonValue::Null) => return Err(GradingFailure::MissingField("grade")),
        Some(grade) => parse_score(grade).ok_or_else(|| GradingFailure::InvalidGrade(grade.to_string()))?,
    };

    let comments = match object.get("comments") {
        None | Some(JsonValue::Null) => return Err(GradingFailure::MissingField("comments")),
        Some(comments) => comments_text(comments),
    };

    Ok((grade, comments))
}

fn parse_score(value: &JsonValue) -> Option<Score> {
    match value {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Score::new(i)
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .and_then(|f| Score::new(f as i64))
            }
        }
        JsonValue::String(s) => s.trim().parse::<i64>().ok().and_then(Score::new),
        _ => None,
    }
}

/// 把评语展开成一段文本
///
/// 对象和数组按顺序取出各项文本，以空格连接；`{"reasoning": .., "suggestions": ..}`
/// 这类结构会变成 "reasoning 内容 suggestions 内容"，不带键名。
fn comments_text(value: &JsonValue) -> String {
    fn collect(value: &JsonValue, parts: &mut Vec<String>) {
        match value {
            JsonValue::Null => {}
            JsonValue::String(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
            JsonValue::Array(items) => items.iter().for_each(|item| collect(item, parts)),
            JsonValue::Object(map) => map.values().for_each(|item| collect(item, parts)),
            other => parts.push(other.to_string()),
        }
    }

    let mut parts = Vec::new();
    collect(value, &mut parts);
    parts.join(" ")
}

/// 去掉 ```json ... ``` 包裹
fn strip_code_fence(raw: &str) -> &str {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").ok());

    fence
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
        .trim()
}
