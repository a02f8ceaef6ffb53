//! LLM API 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）
//! - 超时由 `reqwest` 客户端控制，值来自配置

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::provider::{ChatRequest, LlmProvider};
use crate::config::Config;
use crate::error::LlmError;

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmClient {
    /// 创建指定模型的 LLM 客户端
    pub fn with_model(config: &Config, model_name: impl Into<String>) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
        {
            Ok(http_client) => Client::with_config(openai_config).with_http_client(http_client),
            Err(e) => {
                warn!("HTTP 客户端创建失败，使用默认设置（无超时）: {}", e);
                Client::with_config(openai_config)
            }
        };

        Self {
            client,
            model_name: model_name.into(),
        }
    }

    /// 评分用客户端
    pub fn for_grading(config: &Config) -> Self {
        Self::with_model(config, config.grading_model_name.clone())
    }

    /// 文字识别用客户端
    pub fn for_vision(config: &Config) -> Self {
        Self::with_model(config, config.vision_model_name.clone())
    }

    /// 把 `ChatRequest` 转成 OpenAI 请求体
    fn build_request(&self, request: &ChatRequest) -> Result<CreateChatCompletionRequest, LlmError> {
        let build_err = |e| LlmError::request_build_failed(&self.model_name, e);

        let mut messages = Vec::new();

        if let Some(sys_msg) = &request.system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg.as_str())
                .build()
                .map_err(build_err)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 有图片时走 Vision API：文本 + 图片两部分
        let user_msg = match &request.image_url {
            Some(url) => {
                let content_parts = vec![
                    ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText {
                            text: request.user_message.clone(),
                        },
                    ),
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: url.clone(),
                                detail: Some(ImageDetail::High),
                            },
                        },
                    ),
                ];
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                    .build()
                    .map_err(build_err)?
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(request.user_message.as_str())
                .build()
                .map_err(build_err)?,
        };
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model_name)
            .messages(messages)
            .max_tokens(2048u32);
        if let Some(temperature) = request.temperature {
            builder.temperature(temperature);
        }
        if request.json_response {
            builder.response_format(ResponseFormat::JsonObject);
        }

        builder.build().map_err(build_err)
    }
}

#[async_trait]
impl LlmProvider for LlmClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", request.user_message.len());

        let openai_request = self.build_request(request)?;

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                LlmError::api_call_failed(&self.model_name, e)
            })?;

        debug!("LLM API 调用成功");

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        let content = choice.message.content.ok_or_else(|| LlmError::EmptyContent {
            model: self.model_name.clone(),
        })?;

        Ok(content.trim().to_string())
    }
}
