//! 错误类型
//!
//! 逐维度评分失败不在这里：它在 `services::dimension_grader` 内部被
//! 转换成 `Grade::Ungraded`，永远不会越过编排层。

use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 投稿清单错误
    #[error("清单错误: {0}")]
    Manifest(#[from] ManifestError),
    /// 图片文字识别错误（整份投稿失败）
    #[error("文字识别错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 持久化错误
    #[error("持久化错误: {0}")]
    Persistence(#[from] PersistenceError),
    /// 查询对象不存在
    #[error("{0}")]
    NotFound(#[from] NotFound),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 请求构建失败
    #[error("LLM 请求构建失败 (模型: {model}): {source}")]
    RequestBuildFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 图片文字识别错误
///
/// 总是带着出错的文件名，调用方据此告诉用户是哪张图片失败。
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 读取图片文件失败
    #[error("读取图片失败 ({filename}): {source}")]
    ImageReadFailed {
        filename: String,
        #[source]
        source: std::io::Error,
    },
    /// 视觉模型调用失败
    #[error("识别图片文字失败 ({filename}): {source}")]
    ProviderFailed {
        filename: String,
        #[source]
        source: LlmError,
    },
}

impl ExtractionError {
    /// 出错的图片文件名
    pub fn filename(&self) -> &str {
        match self {
            ExtractionError::ImageReadFailed { filename, .. }
            | ExtractionError::ProviderFailed { filename, .. } => filename,
        }
    }
}

/// 持久化阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStage {
    Open,
    Author,
    Essay,
    Images,
    Grades,
    Commit,
    Query,
}

impl PersistStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PersistStage::Open => "open",
            PersistStage::Author => "author",
            PersistStage::Essay => "essay",
            PersistStage::Images => "images",
            PersistStage::Grades => "grades",
            PersistStage::Commit => "commit",
            PersistStage::Query => "query",
        }
    }
}

impl std::fmt::Display for PersistStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 写入或读取数据库失败，附带失败阶段
#[derive(Debug, Error)]
#[error("数据库操作失败 (阶段: {stage}): {source}")]
pub struct PersistenceError {
    pub stage: PersistStage,
    #[source]
    pub source: rusqlite::Error,
}

impl PersistenceError {
    pub fn new(stage: PersistStage, source: rusqlite::Error) -> Self {
        Self { stage, source }
    }
}

/// 查询对象不存在（客户端可见，不是系统错误）
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFound {
    #[error("作者 {0} 不存在")]
    Author(String),
    #[error("作文 #{0} 不存在")]
    Essay(i64),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    FileParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 投稿清单错误
#[derive(Debug, Error)]
pub enum ManifestError {
    /// 目录不存在
    #[error("目录不存在: {}", path.display())]
    FolderNotFound { path: PathBuf },
    /// 读取清单失败
    #[error("读取清单失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 清单解析失败
    #[error("清单解析失败 ({}): {source}", path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 清单没有列出任何图片
    #[error("清单未包含图片: {}", path.display())]
    NoImages { path: PathBuf },
}

// ========== 便捷构造函数 ==========

impl LlmError {
    /// 创建LLM API调用错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// 创建请求构建错误
    pub fn request_build_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::RequestBuildFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
