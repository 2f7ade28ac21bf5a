//! 提交处理上下文
//!
//! 封装"我正在评第几份提交、属于哪个作业和学生"这一信息

use std::fmt::Display;

use crate::models::SubmissionDraft;

/// 提交处理上下文（仅用于日志显示）
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 提交索引（从1开始）
    pub index: usize,

    /// 作业ID
    pub assignment_id: String,

    /// 学生ID
    pub student_id: Option<String>,

    /// 来源文件
    pub source: String,
}

impl SubmissionCtx {
    pub fn from_draft(draft: &SubmissionDraft, index: usize) -> Self {
        Self {
            index,
            assignment_id: draft.assignment_id.clone(),
            student_id: draft.student_id.clone(),
            source: draft
                .file_path
                .clone()
                .unwrap_or_else(|| format!("submission-{}", index)),
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[提交 #{} 作业#{} 学生#{}]",
            self.index,
            self.assignment_id,
            self.student_id.as_deref().unwrap_or("-")
        )
    }
}
