use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时处理的投稿数量
    pub max_concurrent_submissions: usize,
    /// 投稿清单（TOML）存放目录
    pub submissions_folder: String,
    /// SQLite 数据库路径
    pub database_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 设置后只打印该作者的历史评分，不处理投稿目录
    pub report_author: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// 评分模型（需支持 JSON 输出）
    pub grading_model_name: String,
    /// 文字识别模型（需支持图片输入）
    pub vision_model_name: String,
    /// 每次外部调用的超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_submissions: 4,
            submissions_folder: "submissions".to_string(),
            database_path: "essays.db".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            report_author: None,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            grading_model_name: "gpt-4o".to_string(),
            vision_model_name: "gpt-4o".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl Config {
    /// 默认值 → `CONFIG_FILE` 指向的 TOML 文件 → 环境变量，后者覆盖前者
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取，缺省字段取默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::FileParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    fn with_env_overrides(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = lookup("LLM_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));

        Ok(Self {
            max_concurrent_submissions: parse_var(
                &lookup,
                "MAX_CONCURRENT_SUBMISSIONS",
                self.max_concurrent_submissions,
            )?
            .max(1),
            submissions_folder: lookup("SUBMISSIONS_FOLDER").unwrap_or(self.submissions_folder),
            database_path: lookup("DATABASE_PATH").unwrap_or(self.database_path),
            verbose_logging: parse_flag(&lookup, "VERBOSE_LOGGING", self.verbose_logging)?,
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            report_author: lookup("REPORT_AUTHOR").or(self.report_author),
            llm_api_key: api_key.unwrap_or(self.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            grading_model_name: lookup("GRADING_MODEL_NAME").unwrap_or(self.grading_model_name),
            vision_model_name: lookup("VISION_MODEL_NAME").unwrap_or(self.vision_model_name),
            request_timeout_secs: parse_var(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                self.request_timeout_secs,
            )?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var_name) {
        Some(value) => value.parse().map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: std::any::type_name::<T>().to_string(),
        }),
        None => Ok(default),
    }
}

/// 开关类变量：接受 true/false、1/0、yes/no、on/off（不区分大小写）
fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = lookup(var_name) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: "bool".to_string(),
        }),
    }
}
