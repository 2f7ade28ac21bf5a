//! 单份提交处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **构建请求**：把 `SubmissionDraft` 转换为 `GradingRequest`
//! 2. **流程调度**：委托 `GradingFlow` 评分，收到停止信号时取消
//! 3. **降级处理**：评分失败时生成降级结果并写入降级记录
//! 4. **结果输出**：写出 `{results_folder}/{文件名}.json`

use crate::config::Config;
use crate::models::{Submission, SubmissionDraft};
use crate::services::FailureLog;
use crate::utils::truncate_text;
use crate::workflow::{degraded_result, GradingFlow, SubmissionCtx};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// 单份提交的评分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeOutcome {
    /// AI 正常评分
    Graded,
    /// 评分失败，已写入降级结果
    Degraded,
}

/// 处理单份提交
///
/// # 返回
/// 评分结果类型；只有写出结果文件失败时才返回错误
pub async fn process_submission(
    flow: &GradingFlow,
    failure_log: &FailureLog,
    draft: SubmissionDraft,
    index: usize,
    config: &Config,
    shutdown: watch::Receiver<bool>,
) -> Result<GradeOutcome> {
    let ctx = SubmissionCtx::from_draft(&draft, index);
    info!(
        "{} 开始评分，学生图片 {} 张",
        ctx,
        draft.image_paths.len()
    );
    if !draft.question.is_empty() {
        debug!("{} 题目: {}", ctx, truncate_text(&draft.question, 60));
    }

    let request = draft.to_grading_request();
    let (result, outcome) = match flow
        .grade_submission_until(&request, flow.max_retries(), wait_for_shutdown(shutdown))
        .await
    {
        Ok(result) => {
            info!("{} ✓ 评分完成，得分: {}", ctx, result.score);
            (result, GradeOutcome::Graded)
        }
        Err(e) => {
            error!("{} ❌ 评分失败 ({}): {}", ctx, e.kind().as_str(), e);
            if let Err(log_err) =
                failure_log.write(&ctx.source, &ctx.assignment_id, e.kind(), &e.to_string())
            {
                warn!("{} ⚠️ 写入降级记录失败: {}", ctx, log_err);
            }
            (degraded_result(&e, config.development), GradeOutcome::Degraded)
        }
    };

    let submission = Submission::pending(&draft).with_result(result);
    let stem = draft
        .file_stem()
        .unwrap_or_else(|| format!("submission-{}", submission.id));
    let output = write_result(&config.results_folder, &stem, &submission).await?;
    info!("{} 结果已保存: {}", ctx, output.display());

    Ok(outcome)
}

/// 写出评分结果 JSON
async fn write_result(folder: &str, stem: &str, submission: &Submission) -> Result<PathBuf> {
    fs::create_dir_all(folder)
        .await
        .with_context(|| format!("无法创建结果文件夹: {}", folder))?;

    let path = Path::new(folder).join(format!("{}.json", stem));
    let json = serde_json::to_string_pretty(submission)?;
    fs::write(&path, json)
        .await
        .with_context(|| format!("无法写入结果文件: {}", path.display()))?;

    Ok(path)
}

/// 停止信号为 true 时完成；发送端关闭则永不完成
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
