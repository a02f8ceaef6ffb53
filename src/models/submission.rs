use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ExtractionError;
use crate::models::grade::{GradeRecord, GradingReport};

/// 入库时间格式（UTC）
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 投稿清单（TOML 文件）
///
/// ```toml
/// author = "jdoe"
/// title = "My Summer"
/// images = ["page_1.png", "page_2.png"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionManifest {
    pub author: String,
    pub title: String,
    /// 图片路径，相对路径以清单所在目录为基准；顺序即上传顺序
    pub images: Vec<String>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<PathBuf>,
}

impl SubmissionManifest {
    /// 解析后的图片路径（保持清单顺序）
    pub fn image_paths(&self) -> Vec<PathBuf> {
        let base = self
            .file_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.images
            .iter()
            .map(|img| {
                let path = Path::new(img);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    base.join(path)
                }
            })
            .collect()
    }

    pub fn with_file_path(mut self, file_path: PathBuf) -> Self {
        self.file_path = Some(file_path);
        self
    }
}

/// 一张上传的图片
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// 从磁盘读取图片，文件名记录为给定路径
    pub async fn read(path: &Path) -> Result<Self, ExtractionError> {
        let filename = path.to_string_lossy().to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractionError::ImageReadFailed {
                filename: filename.clone(),
                source,
            })?;
        Ok(Self { filename, bytes })
    }

    /// 根据扩展名推断 MIME 类型，未知时按 JPEG 处理
    pub fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        }
    }
}

/// 一次投稿：作者、标题、按上传顺序排列的图片
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub authorname: String,
    pub title: String,
    pub images: Vec<ImageUpload>,
}

/// 拼接各图片识别出的文字：单个空格分隔，保持上传顺序
pub fn join_essay_text<I, S>(texts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 当前时间的入库字符串
pub fn submission_timestamp() -> String {
    chrono::Utc::now().format(DATE_FORMAT).to_string()
}

/// 投稿结果，返回给调用方
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub essay_id: i64,
    pub text: String,
    pub grades: Vec<GradeRecord>,
    #[serde(skip)]
    pub report: GradingReport,
}

/// 待入库的一份投稿（作文 + 图片 + 六条评分）
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub authorname: String,
    pub title: String,
    pub text: String,
    pub date_submitted: String,
    pub image_paths: Vec<String>,
    pub grades: Vec<GradeRecord>,
}

/// 作者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub authorname: String,
    pub name: Option<String>,
}

/// 作文摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssaySummary {
    pub id: i64,
    pub title: String,
    pub date_submitted: String,
}

/// 作者及其作文列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub authorname: String,
    pub name: Option<String>,
    pub essays: Vec<EssaySummary>,
}

/// 已入库的作文（含评分和图片）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEssay {
    pub id: i64,
    pub authorname: String,
    pub title: String,
    pub text: String,
    pub date_submitted: String,
    pub grades: Vec<GradeRecord>,
    pub images: Vec<String>,
}
