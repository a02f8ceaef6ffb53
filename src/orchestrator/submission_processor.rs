//! 单份投稿处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **读取图片**：按清单顺序读取图片文件
//! 2. **流程调度**：委托 `SubmissionFlow` 完成识别、评分、入库
//! 3. **结果输出**：按目录顺序打印评分表
//! 4. **文件标记**：入库成功后把清单重命名为 `*.toml.done`

use std::path::Path;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::infrastructure::EssayStore;
use crate::models::submission::{ImageUpload, SubmissionManifest, SubmissionOutcome, SubmissionRequest};
use crate::workflow::{SubmissionCtx, SubmissionFlow};

/// 处理单份投稿清单
///
/// # 参数
/// - `flow`: 投稿处理流程
/// - `store`: 作文存储
/// - `manifest`: 投稿清单
/// - `submission_index`: 投稿序号（用于日志）
pub async fn process_submission(
    flow: &SubmissionFlow,
    store: &dyn EssayStore,
    manifest: SubmissionManifest,
    submission_index: usize,
) -> AppResult<SubmissionOutcome> {
    let ctx = SubmissionCtx::new(
        submission_index,
        manifest.author.clone(),
        manifest.title.clone(),
    );
    info!("{} 开始处理，图片 {} 张", ctx, manifest.images.len());

    let mut images = Vec::with_capacity(manifest.images.len());
    for path in manifest.image_paths() {
        images.push(ImageUpload::read(&path).await?);
    }

    let request = SubmissionRequest {
        authorname: manifest.author.clone(),
        title: manifest.title.clone(),
        images,
    };

    let outcome = flow.submit(store, request, &ctx).await?;

    for line in outcome.report.to_string().lines() {
        info!("{} {}", ctx, line);
    }

    if let Some(file_path) = manifest.file_path.as_deref() {
        mark_done(file_path, &ctx).await;
    }

    info!("{} ✅ 投稿处理完成", ctx);
    Ok(outcome)
}

/// 标记清单已处理，避免下次重复评分
///
/// 重命名失败只记录警告，投稿已经入库。
async fn mark_done(file_path: &Path, ctx: &SubmissionCtx) -> bool {
    let mut done = file_path.as_os_str().to_owned();
    done.push(".done");

    match tokio::fs::rename(file_path, &done).await {
        Ok(()) => {
            info!("{} 🗂️ 清单已标记完成: {}", ctx, Path::new(&done).display());
            true
        }
        Err(e) => {
            warn!("{} ⚠️ 无法重命名清单 {}: {}", ctx, file_path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SubmissionCtx {
        SubmissionCtx::new(1, "jdoe".to_string(), "My Summer".to_string())
    }

    #[tokio::test]
    async fn test_mark_done_renames_manifest() {
        let dir = std::env::temp_dir().join(format!("essay_grader_mark_done_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let manifest = dir.join("summer.toml");
        std::fs::write(&manifest, "author = \"jdoe\"").unwrap();

        assert!(mark_done(&manifest, &ctx()).await);
        assert!(!manifest.exists());
        assert!(dir.join("summer.toml.done").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_mark_done_missing_file_only_warns() {
        let missing = std::env::temp_dir().join("essay_grader_no_such_manifest.toml");
        assert!(!mark_done(&missing, &ctx()).await);
    }
}
