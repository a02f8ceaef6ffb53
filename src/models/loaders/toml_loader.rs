use crate::error::ManifestError;
use crate::models::submission::SubmissionManifest;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载投稿清单
pub async fn load_submission_manifest(toml_file_path: &Path) -> Result<SubmissionManifest, ManifestError> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| ManifestError::ReadFailed {
            path: toml_file_path.to_path_buf(),
            source,
        })?;

    let manifest: SubmissionManifest =
        toml::from_str(&content).map_err(|source| ManifestError::ParseFailed {
            path: toml_file_path.to_path_buf(),
            source,
        })?;

    if manifest.images.is_empty() {
        return Err(ManifestError::NoImages {
            path: toml_file_path.to_path_buf(),
        });
    }

    Ok(manifest.with_file_path(toml_file_path.to_path_buf()))
}

/// 从文件夹中加载所有投稿清单
///
/// 单个清单加载失败只记录警告并跳过；结果按文件名排序，保证处理顺序稳定。
pub async fn load_all_manifests(folder_path: &str) -> Result<Vec<SubmissionManifest>, ManifestError> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(ManifestError::FolderNotFound { path: folder });
    }

    let read_failed = |source| ManifestError::ReadFailed {
        path: folder.clone(),
        source,
    };

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder).await.map_err(read_failed)?;

    while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut manifests = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission_manifest(&path).await {
            Ok(manifest) => {
                tracing::info!("成功加载清单，包含 {} 张图片", manifest.images.len());
                manifests.push(manifest);
            }
            Err(e) => {
                tracing::warn!("加载清单失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "essay_grader_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_all_manifests_skips_invalid() {
        let dir = scratch_dir("loader");
        std::fs::write(
            dir.join("b.toml"),
            "author = \"jdoe\"\ntitle = \"My Summer\"\nimages = [\"p1.png\"]\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("a.toml"),
            "author = \"amy\"\ntitle = \"Dogs\"\nimages = [\"d1.jpg\", \"d2.jpg\"]\n",
        )
        .unwrap();
        std::fs::write(dir.join("broken.toml"), "author = ").unwrap();
        std::fs::write(dir.join("empty.toml"), "author = \"x\"\ntitle = \"y\"\nimages = []\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let manifests = load_all_manifests(dir.to_str().unwrap()).await.unwrap();
        let authors: Vec<&str> = manifests.iter().map(|m| m.author.as_str()).collect();
        assert_eq!(authors, vec!["amy", "jdoe"]);
        assert_eq!(manifests[0].image_paths()[1], dir.join("d2.jpg"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let result = load_all_manifests("/definitely/not/here").await;
        assert!(matches!(result, Err(ManifestError::FolderNotFound { .. })));
    }
}
