//! LLM 传输层 - 基础设施层
//!
//! 持有 HTTP 客户端，只暴露"发送一次 chat completion 请求"的能力

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{GradingError, Result};

/// 一次请求的原始响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// 服务端返回的 retry-after 头（原始字符串）
    pub retry_after: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn rate_limited(retry_after: Option<&str>) -> Self {
        Self {
            status: 429,
            retry_after: retry_after.map(str::to_string),
            body: String::new(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// Chat completion 传输能力
///
/// 职责：
/// - 发送一次请求，不做重试
/// - 429 以响应形式返回（保留 retry-after），由调度器决定是否重试
/// - 其他非 2xx 状态码返回 `GradingError::Api`
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(&self, body: &JsonValue) -> Result<TransportResponse>;
}

/// 基于 reqwest 的 HTTP 传输
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    /// 使用外部构建好的客户端
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                config.llm_api_base_url.trim_end_matches('/')
            ),
            api_key: config.llm_api_key.clone(),
        }
    }

    /// 按配置构建客户端（请求超时取自配置）
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self::new(client, config))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post_chat(&self, body: &JsonValue) -> Result<TransportResponse> {
        debug!("📡 POST {}", self.endpoint);

        let resp = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        debug!("📥 LLM 响应状态: {}", status);

        let text = resp.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(TransportResponse {
                status: status.as_u16(),
                retry_after,
                body: text,
            });
        }

        if !status.is_success() {
            return Err(GradingError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(TransportResponse {
            status: status.as_u16(),
            retry_after,
            body: text,
        })
    }
}
