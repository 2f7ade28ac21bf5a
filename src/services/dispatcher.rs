//! 请求调度服务 - 业务能力层
//!
//! 构建 chat completion 请求体并发送，遇到频率限制时按指数退避重试
//!
//! ## 状态
//! `NotStarted → Attempting → {Succeeded, RateLimited → sleep → Attempting, Failed}`

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    ChatCompletionRequestUserMessageContentPart, ImageDetail, ImageUrl,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::{Config, ModelKind};
use crate::error::{GradingError, Result};
use crate::infrastructure::ChatTransport;
use crate::services::content_assembler::ContentBlock;
use crate::services::prompt::REASONING_IMAGE_NOTE;
use crate::utils::logging::redact_data_uris;

/// 指数退避上限（毫秒）
const MAX_BACKOFF_MS: u64 = 16_000;

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionRequestMessage>,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// 请求调度服务
///
/// 职责：
/// - 根据模型能力构建请求体（推理模型去掉图片和 temperature）
/// - 通过注入的传输层发送请求
/// - 只对频率限制重试，其他错误立即返回
pub struct RequestDispatcher {
    transport: Arc<dyn ChatTransport>,
    model_name: String,
    model_kind: ModelKind,
    temperature: f32,
    log_payload: bool,
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn ChatTransport>, config: &Config) -> Self {
        Self {
            transport,
            model_name: config.llm_model_name.clone(),
            model_kind: config.model_kind,
            temperature: config.temperature,
            log_payload: config.development,
        }
    }

    /// 构建请求体
    pub fn build_request_body(
        &self,
        system_prompt: &str,
        blocks: Vec<ContentBlock>,
    ) -> Result<JsonValue> {
        let blocks = self.adapt_for_model(blocks);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()?;

        let parts: Vec<ChatCompletionRequestUserMessageContentPart> =
            blocks.into_iter().map(to_content_part).collect();

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(parts))
            .build()?;

        let body = ChatRequestBody {
            model: &self.model_name,
            messages: vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self
                .model_kind
                .accepts_temperature()
                .then_some(self.temperature),
        };

        let value = serde_json::to_value(&body)?;

        if self.log_payload {
            debug!(
                "LLM 请求载荷结构: {}",
                serde_json::to_string_pretty(&redact_data_uris(&value)).unwrap_or_default()
            );
        }

        Ok(value)
    }

    /// 推理模型不接受图片：移除所有图片块并追加说明
    fn adapt_for_model(&self, blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
        if self.model_kind.accepts_images() || !blocks.iter().any(ContentBlock::is_image) {
            return blocks;
        }

        warn!(
            "⚠️ 推理模型 {} 不支持图片输入，图片将被忽略",
            self.model_name
        );
        let mut text_only: Vec<ContentBlock> =
            blocks.into_iter().filter(|b| !b.is_image()).collect();
        text_only.push(ContentBlock::Text(REASONING_IMAGE_NOTE.to_string()));
        text_only
    }

    /// 发送请求，频率限制时最多重试 `max_retries` 次（共 `max_retries + 1` 次尝试）
    ///
    /// 返回原始响应体
    pub async fn dispatch(&self, body: &JsonValue, max_retries: u32) -> Result<String> {
        let total_attempts = max_retries + 1;
        let mut attempt: u32 = 0;

        loop {
            debug!(
                "调用 LLM API，模型: {} (尝试 {}/{})",
                self.model_name,
                attempt + 1,
                total_attempts
            );

            let retry_after = match self.transport.post_chat(body).await {
                Ok(resp) if resp.is_rate_limited() => resp.retry_after,
                Ok(resp) if (200..300).contains(&resp.status) => {
                    debug!("LLM API 调用成功");
                    return Ok(resp.body);
                }
                Ok(resp) => {
                    let err = GradingError::Api {
                        status: resp.status,
                        body: resp.body,
                    };
                    error!("❌ AI 评分请求失败: {}", err);
                    return Err(err);
                }
                Err(e) if e.is_rate_limited() => None,
                Err(e) => {
                    error!("❌ AI 评分请求失败: {}", e);
                    return Err(e);
                }
            };

            if attempt >= max_retries {
                error!("❌ 请求频率限制，已尝试 {} 次，放弃", attempt + 1);
                return Err(GradingError::RateLimited {
                    attempts: attempt + 1,
                    retry_after,
                });
            }

            let delay = retry_delay(retry_after.as_deref(), attempt);
            warn!(
                "⚠️ 请求频率限制 (429)，{}ms 后重试 (尝试 {}/{})",
                delay.as_millis(),
                attempt + 1,
                total_attempts
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}

/// 计算重试等待时间：优先使用 retry-after（秒），否则 `min(1000 * 2^attempt, 16000)` 毫秒
pub fn retry_delay(retry_after: Option<&str>, attempt: u32) -> Duration {
    if let Some(secs) = retry_after.and_then(|v| v.trim().parse::<u64>().ok()) {
        return Duration::from_millis(secs.saturating_mul(1000));
    }
    let backoff = 1000u64.saturating_mul(1u64 << attempt.min(16));
    Duration::from_millis(backoff.min(MAX_BACKOFF_MS))
}

fn to_content_part(block: ContentBlock) -> ChatCompletionRequestUserMessageContentPart {
    match block {
        ContentBlock::Text(text) => ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartText { text },
        ),
        ContentBlock::Image(url) => ChatCompletionRequestUserMessageContentPart::ImageUrl(
            ChatCompletionRequestMessageContentPartImage {
                image_url: ImageUrl {
                    url,
                    detail: Some(ImageDetail::Auto),
                },
            },
        ),
    }
}
