//! 图片文字识别服务 - 业务能力层
//!
//! 只负责"把一张图片变成文字"，不关心投稿和评分

use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clients::{ChatRequest, LlmProvider};
use crate::error::ExtractionError;
use crate::models::submission::ImageUpload;

/// 发给视觉模型的转写指令
pub const TRANSCRIPTION_INSTRUCTION: &str = "Return only the text that is in the image. \
Be as precise as possible: transcribe it literally, keeping the original spelling, \
punctuation and line order. Do not paraphrase, correct or summarize anything.";

/// 图片文字识别服务
///
/// 职责：
/// - 每张图片调用一次视觉模型
/// - 返回的文字原样接受（包括空字符串）
/// - 失败时返回带文件名的错误，不做兜底
pub struct TextExtractor {
    provider: Arc<dyn LlmProvider>,
}

impl TextExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// 识别一张图片中的文字
    pub async fn extract_text(&self, image: &ImageUpload) -> Result<String, ExtractionError> {
        debug!(
            "识别图片文字: {} ({} 字节, {})",
            image.filename,
            image.bytes.len(),
            image.mime_type()
        );

        let request = ChatRequest::new(TRANSCRIPTION_INSTRUCTION).with_image(to_data_url(image));

        match self.provider.chat(&request).await {
            Ok(text) => {
                debug!("图片 {} 识别完成，{} 个字符", image.filename, text.chars().count());
                Ok(text)
            }
            Err(source) => {
                warn!("图片 {} 识别失败: {}", image.filename, source);
                Err(ExtractionError::ProviderFailed {
                    filename: image.filename.clone(),
                    source,
                })
            }
        }
    }
}

/// 图片内容编码成 data URL
pub fn to_data_url(image: &ImageUpload) -> String {
    format!(
        "data:{};base64,{}",
        image.mime_type(),
        STANDARD.encode(&image.bytes)
    )
}
