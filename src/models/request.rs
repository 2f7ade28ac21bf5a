use serde::{Deserialize, Serialize};

use crate::error::{GradingError, Result};
use crate::models::image::ImageRef;

/// 一次 AI 评分请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradingRequest {
    /// 学生手写作答图片（顺序有意义）
    #[serde(default)]
    pub student_images: Vec<ImageRef>,
    /// 教师标准答案（文本）
    #[serde(default)]
    pub model_solution_text: Option<String>,
    /// 题目（文本）
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub question_images: Vec<ImageRef>,
    #[serde(default)]
    pub model_solution_images: Vec<ImageRef>,
}

impl GradingRequest {
    pub fn new(student_images: Vec<ImageRef>) -> Self {
        Self {
            student_images,
            ..Default::default()
        }
    }

    pub fn with_question(mut self, text: impl Into<String>) -> Self {
        self.question_text = Some(text.into());
        self
    }

    pub fn with_model_solution(mut self, text: impl Into<String>) -> Self {
        self.model_solution_text = Some(text.into());
        self
    }

    pub fn with_question_images(mut self, images: Vec<ImageRef>) -> Self {
        self.question_images = images;
        self
    }

    pub fn with_model_solution_images(mut self, images: Vec<ImageRef>) -> Self {
        self.model_solution_images = images;
        self
    }

    /// 题目文本（空字符串视为未提供）
    pub fn question(&self) -> Option<&str> {
        non_empty(self.question_text.as_deref())
    }

    /// 标准答案文本（空字符串视为未提供）
    pub fn model_solution(&self) -> Option<&str> {
        non_empty(self.model_solution_text.as_deref())
    }

    /// 至少需要题目文本、标准答案文本或学生图片之一
    pub fn validate(&self) -> Result<()> {
        if self.question().is_none()
            && self.model_solution().is_none()
            && self.student_images.is_empty()
        {
            return Err(GradingError::EmptyRequest);
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_request() {
        let request = GradingRequest::default()
            .with_question("")
            .with_model_solution("");
        assert!(matches!(request.validate(), Err(GradingError::EmptyRequest)));
    }

    #[test]
    fn test_validate_accepts_any_single_source() {
        assert!(GradingRequest::default().with_question("x + 1 = 2").validate().is_ok());
        assert!(GradingRequest::default().with_model_solution("x = 1").validate().is_ok());
        assert!(GradingRequest::new(vec!["a.png".into()]).validate().is_ok());
    }

    #[test]
    fn test_question_images_alone_are_not_enough() {
        let request =
            GradingRequest::default().with_question_images(vec!["https://cdn.site/q.png".into()]);
        assert!(request.validate().is_err());
    }
}
