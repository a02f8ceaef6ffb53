//! 集成测试共用的脚本化服务
#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use essay_grader::error::LlmError;
use essay_grader::models::rubric::{catalog, RubricDimension};
use essay_grader::models::ImageUpload;
use essay_grader::{ChatRequest, LlmProvider};

type Script = dyn Fn(&RubricDimension, &str) -> Result<String, LlmError> + Send + Sync;

/// 评分服务：按请求中的维度执行脚本，并统计调用次数
pub struct ScriptedGrader {
    script: Box<Script>,
    delay: Box<dyn Fn(&RubricDimension) -> Duration + Send + Sync>,
    calls: AtomicUsize,
}

impl ScriptedGrader {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&RubricDimension, &str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            delay: Box::new(|_| Duration::ZERO),
            calls: AtomicUsize::new(0),
        }
    }

    /// 按维度设置响应延迟
    pub fn with_delay<D>(mut self, delay: D) -> Self
    where
        D: Fn(&RubricDimension) -> Duration + Send + Sync + 'static,
    {
        self.delay = Box::new(delay);
        self
    }

    /// 每个维度都给出同一个分数
    pub fn constant(grade: u8) -> Self {
        Self::new(move |dimension, _| Ok(graded(grade, &format!("{} looks fine.", dimension.key))))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedGrader {
    fn model_name(&self) -> &str {
        "scripted-grader"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let dimension = dimension_of(request).expect("request carries a rubric");
        let delay = (self.delay)(dimension);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        (self.script)(dimension, &request.user_message)
    }
}

/// 通过系统消息找到请求对应的维度
pub fn dimension_of(request: &ChatRequest) -> Option<&'static RubricDimension> {
    let system = request.system_message.as_deref()?;
    catalog().iter().find(|d| d.instructions == system)
}

pub fn graded(grade: u8, comments: &str) -> String {
    serde_json::json!({ "grade": grade, "comments": comments }).to_string()
}

pub fn provider_failure() -> LlmError {
    LlmError::EmptyResponse {
        model: "scripted".to_string(),
    }
}

/// 识别服务：图片内容就是"识别结果"
///
/// 内容写成 `毫秒|文字` 时先等待再返回；文字为 `FAIL` 时返回错误。
pub struct EchoVision {
    calls: AtomicUsize,
}

impl EchoVision {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for EchoVision {
    fn model_name(&self) -> &str {
        "echo-vision"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.image_url.as_deref().expect("vision request has an image");
        let (_, encoded) = url.split_once(";base64,").expect("data url");
        let decoded = String::from_utf8(STANDARD.decode(encoded).expect("base64")).expect("utf8");

        let text = match decoded.split_once('|') {
            Some((delay_ms, text)) => {
                tokio::time::sleep(Duration::from_millis(delay_ms.parse().expect("delay"))).await;
                text.to_string()
            }
            None => decoded,
        };

        if text == "FAIL" {
            return Err(provider_failure());
        }
        Ok(text)
    }
}

/// 构造一张图片，`delay_ms` 控制识别耗时
pub fn image(filename: &str, text: &str, delay_ms: u64) -> ImageUpload {
    ImageUpload::new(filename, format!("{}|{}", delay_ms, text).into_bytes())
}
