//! LLM 调用接口
//!
//! 能力层只依赖这个 trait，测试里用脚本化的实现替换真实客户端。

use async_trait::async_trait;

use crate::error::LlmError;

/// 一次聊天请求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /// 系统消息（可选）
    pub system_message: Option<String>,
    /// 用户消息
    pub user_message: String,
    /// 附带的图片（data URL 或 http URL）
    pub image_url: Option<String>,
    /// 要求模型只返回 JSON 对象
    pub json_response: bool,
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = Some(system_message.into());
        self
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn json_object(mut self) -> Self {
        self.json_response = true;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// 兼容 OpenAI Chat API 的服务
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// 模型名称（用于日志和错误信息）
    fn model_name(&self) -> &str;

    /// 发送一次请求，返回去掉首尾空白的文本
    ///
    /// 只尝试一次，不做重试。
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError>;
}
