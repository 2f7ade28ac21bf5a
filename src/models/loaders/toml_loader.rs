use crate::models::submission::SubmissionDraft;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载一份待评分提交
pub async fn load_submission_draft(toml_file_path: &Path) -> Result<SubmissionDraft> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut draft: SubmissionDraft = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    draft.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(draft)
}

/// 从文件夹中加载所有 TOML 文件，解析失败的文件跳过并记录警告
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<SubmissionDraft>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    // read_dir 的顺序不固定
    paths.sort();

    let mut drafts = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission_draft(&path).await {
            Ok(draft) => {
                tracing::info!("成功加载提交，学生图片 {} 张", draft.image_paths.len());
                drafts.push(draft);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(drafts)
}
