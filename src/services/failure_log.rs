//! 降级记录服务 - 业务能力层
//!
//! 只负责"写失败记录"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::error::ErrorKind;

/// 降级记录服务
///
/// 职责：
/// - 把降级评分的提交追加写入记录文件
/// - 只处理单个提交
pub struct FailureLog {
    file_path: String,
}

impl FailureLog {
    pub fn new() -> Self {
        Self {
            file_path: "grading_failures.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    /// 写入一条降级记录
    pub fn write(&self, source: &str, assignment_id: &str, kind: ErrorKind, message: &str) -> Result<()> {
        debug!("写入降级记录: {} | 作业 {} | {}", source, assignment_id, kind.as_str());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        let line = format!(
            "{} | 作业 {} | {} | {}\n",
            source,
            assignment_id,
            kind.as_str(),
            message.replace('\n', " ")
        );

        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

impl Default for FailureLog {
    fn default() -> Self {
        Self::new()
    }
}
