use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::image::ImageRef;
use crate::models::request::GradingRequest;
use crate::models::result::GradingResult;

/// 待评分的提交（来自 TOML 文件）
///
/// 字段与作业记录保持一致：题目、标准答案各自最多一张图片
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionDraft {
    #[serde(deserialize_with = "deserialize_id")]
    pub assignment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub model_solution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_solution_image_url: Option<String>,
    #[serde(default)]
    pub image_paths: Vec<String>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl SubmissionDraft {
    /// 转换为评分请求：空字符串视为未提供，单张题目/答案图片转换为 0 或 1 个元素的列表
    pub fn to_grading_request(&self) -> GradingRequest {
        GradingRequest {
            student_images: self.image_paths.iter().map(|p| ImageRef::parse(p)).collect(),
            model_solution_text: Some(self.model_solution.clone()).filter(|s| !s.is_empty()),
            question_text: Some(self.question.clone()).filter(|s| !s.is_empty()),
            question_images: optional_image(self.question_image_url.as_deref()),
            model_solution_images: optional_image(self.model_solution_image_url.as_deref()),
        }
    }

    /// 文件名（不含扩展名），用于输出结果文件
    pub fn file_stem(&self) -> Option<String> {
        self.file_path.as_deref().and_then(|p| {
            std::path::Path::new(p)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
        })
    }
}

fn optional_image(url: Option<&str>) -> Vec<ImageRef> {
    url.filter(|u| !u.is_empty())
        .map(|u| vec![ImageRef::parse(u)])
        .unwrap_or_default()
}

/// 已评分的提交记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: String,
    pub student_id: Option<String>,
    pub image_paths: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// None 表示评分尚未完成
    pub ai_result: Option<GradingResult>,
}

impl Submission {
    pub fn pending(draft: &SubmissionDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            assignment_id: draft.assignment_id.clone(),
            student_id: draft.student_id.clone(),
            image_paths: draft.image_paths.clone(),
            created_at: Utc::now(),
            ai_result: None,
        }
    }

    pub fn with_result(mut self, result: GradingResult) -> Self {
        self.ai_result = Some(result);
        self
    }
}

// assignment_id 在 TOML 中可能写成字符串或整数
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
