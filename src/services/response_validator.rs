//! 响应校验服务 - 业务能力层
//!
//! 把原始响应体解析为强类型的评分结果

use regex::Regex;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{GradingError, Result};
use crate::models::GradingResult;

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

fn fenced_json() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"```(?:json)?\s*(\{[\s\S]*\})\s*```").expect("fenced JSON pattern is valid")
    })
}

/// 响应校验服务
///
/// 职责：
/// - 提取 `choices[0].message.content`
/// - 直接解析 JSON，失败时尝试提取 markdown 代码块中的 JSON
/// - 校验必需字段 summary / score，再做严格的类型化解析
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn validate(raw_body: &str) -> Result<GradingResult> {
        let content = Self::extract_content(raw_body)?;
        let value = Self::parse_json(&content)?;
        Self::check_required_fields(&value)?;
        Self::reject_reserved_fields(&value)?;

        let result: GradingResult =
            serde_json::from_value(value).map_err(GradingError::malformed)?;

        if !(0.0..=10.0).contains(&result.score) {
            return Err(GradingError::malformed(format!(
                "score 超出范围 [0, 10]: {}",
                result.score
            )));
        }

        debug!("AI 评分结果解析成功，得分: {}", result.score);
        Ok(result)
    }

    fn extract_content(raw_body: &str) -> Result<String> {
        let response: ChatResponse =
            serde_json::from_str(raw_body).map_err(GradingError::malformed)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GradingError::malformed("LLM 返回内容为空"))
    }

    fn parse_json(content: &str) -> Result<JsonValue> {
        match serde_json::from_str::<JsonValue>(content) {
            Ok(value) => Ok(value),
            Err(parse_err) => {
                warn!("AI 响应不是纯 JSON，尝试提取代码块: {}", parse_err);
                let captured = fenced_json()
                    .captures(content)
                    .and_then(|caps| caps.get(1))
                    .ok_or_else(|| GradingError::malformed(parse_err))?;
                serde_json::from_str(captured.as_str()).map_err(GradingError::malformed)
            }
        }
    }

    fn check_required_fields(value: &JsonValue) -> Result<()> {
        let mut missing = Vec::new();

        let has_summary = value
            .get("summary")
            .and_then(JsonValue::as_str)
            .is_some_and(|s| !s.is_empty());
        if !has_summary {
            missing.push("summary");
        }
        if !value.get("score").is_some_and(JsonValue::is_number) {
            missing.push("score");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GradingError::MissingFields(missing))
        }
    }

    /// `_error` 只由降级结果写入，AI 返回中出现即视为格式错误
    fn reject_reserved_fields(value: &JsonValue) -> Result<()> {
        if value.get("_error").is_some() {
            return Err(GradingError::malformed("unknown field `_error`"));
        }
        Ok(())
    }
}
