//! 评分流程 - 流程层
//!
//! 核心职责：定义"一份提交"的完整评分流程
//!
//! 流程顺序：
//! 1. 检查 API 密钥（未配置直接返回占位结果）
//! 2. 校验请求
//! 3. 组装内容 → 解析图片 → 调度请求（含重试）→ 校验响应

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{GradingError, Result};
use crate::infrastructure::{ChatTransport, HttpTransport};
use crate::models::{GradingRequest, GradingResult};
use crate::services::prompt::TUTOR_PROMPT;
use crate::services::{ContentAssembler, ImageResolver, RequestDispatcher, ResponseValidator};
use crate::workflow::fallback::degraded_result;

/// 评分流程
///
/// - 编排组装、调度和校验
/// - 不持有任何共享可变状态，可被并发调用
/// - 传输层由外部注入
pub struct GradingFlow {
    resolver: ImageResolver,
    dispatcher: RequestDispatcher,
    api_key: String,
    max_retries: u32,
    timeout_secs: u64,
    expose_error_details: bool,
}

impl GradingFlow {
    /// 使用 HTTP 传输创建评分流程
    pub fn new(config: &Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::from_config(config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// 使用指定的传输层创建评分流程
    pub fn with_transport(config: &Config, transport: Arc<dyn ChatTransport>) -> Self {
        if config.has_api_key() && !config.llm_api_key.starts_with("sk-") {
            warn!("⚠️ OpenAI API 密钥格式可能不正确（通常以 'sk-' 开头）");
        }

        Self {
            resolver: ImageResolver::from_config(config),
            dispatcher: RequestDispatcher::new(transport, config),
            api_key: config.llm_api_key.clone(),
            max_retries: config.max_retries,
            timeout_secs: config.grading_timeout_secs,
            expose_error_details: config.development,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// 对一份提交进行 AI 评分
    ///
    /// # 参数
    /// - `request`: 评分请求
    /// - `max_retries`: 遇到频率限制时的最大重试次数
    ///
    /// # 返回
    /// 评分结果；未配置 API 密钥时返回零分占位结果且不发起网络请求
    pub async fn grade_submission(
        &self,
        request: &GradingRequest,
        max_retries: u32,
    ) -> Result<GradingResult> {
        if self.api_key.trim().is_empty() {
            warn!("⚠️ 未配置 OpenAI API 密钥，返回占位评分结果");
            return Ok(GradingResult::not_configured());
        }

        request.validate()?;

        if self.timeout_secs == 0 {
            return self.run_pipeline(request, max_retries).await;
        }

        match tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.run_pipeline(request, max_retries),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GradingError::TimedOut(self.timeout_secs)),
        }
    }

    /// 与 `grade_submission` 相同，但 `shutdown` 先完成时取消评分
    pub async fn grade_submission_until<F>(
        &self,
        request: &GradingRequest,
        max_retries: u32,
        shutdown: F,
    ) -> Result<GradingResult>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.grade_submission(request, max_retries) => result,
            _ = shutdown => {
                warn!("⚠️ 评分已被调用方取消");
                Err(GradingError::Cancelled)
            }
        }
    }

    /// 评分失败时返回降级结果，保证调用方总能拿到一个结果
    pub async fn grade_or_degrade(&self, request: &GradingRequest) -> GradingResult {
        match self.grade_submission(request, self.max_retries).await {
            Ok(result) => result,
            Err(e) => {
                error!("❌ AI 评分失败 ({}): {}", e.kind().as_str(), e);
                degraded_result(&e, self.expose_error_details)
            }
        }
    }

    async fn run_pipeline(
        &self,
        request: &GradingRequest,
        max_retries: u32,
    ) -> Result<GradingResult> {
        let blocks = ContentAssembler::new(&self.resolver).assemble(request).await;
        let body = self.dispatcher.build_request_body(TUTOR_PROMPT, blocks)?;
        let raw = self.dispatcher.dispatch(&body, max_retries).await?;
        let result = ResponseValidator::validate(&raw)?;
        info!("✓ AI 评分完成，得分: {}", result.score);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scripted::{completion_body, ScriptedTransport};
    use crate::infrastructure::TransportResponse;
    use crate::models::ImageRef;
    use serde_json::Value as JsonValue;

    const GRADED: &str = r#"{"summary":"Lời giải đúng","score":9,"mistakes":[],"nextSteps":["Giữ vững phong độ"]}"#;

    fn config() -> Config {
        Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        }
    }

    fn flow(config: &Config, responses: Vec<Result<TransportResponse>>) -> (GradingFlow, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(responses));
        (GradingFlow::with_transport(config, transport.clone()), transport)
    }

    fn image_parts(body: &JsonValue) -> usize {
        body["messages"][1]["content"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|p| p["type"] == "image_url")
            .count()
    }

    #[tokio::test]
    async fn test_missing_api_key_returns_stub_without_network() {
        let (flow, transport) = flow(&Config::default(), vec![]);
        let request = GradingRequest::default().with_question("$2x = 4$");

        let result = flow.grade_submission(&request, 3).await.unwrap();

        assert_eq!(result.score, 0.0);
        assert_eq!(result, GradingResult::not_configured());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_request_fails_before_network() {
        let (flow, transport) = flow(&config(), vec![]);
        let request = GradingRequest::default().with_question("").with_model_solution("");

        let err = flow.grade_submission(&request, 3).await.unwrap_err();

        assert!(matches!(err, GradingError::EmptyRequest));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_image_is_dropped_and_grading_succeeds() {
        let (flow, transport) = flow(&config(), vec![Ok(TransportResponse::ok(completion_body(GRADED)))]);
        let request = GradingRequest::new(vec![ImageRef::parse("/no/such/upload.png")])
            .with_question("Giải $x + 1 = 2$");

        let result = flow.grade_submission(&request, 3).await.unwrap();

        assert_eq!(result.score, 9.0);
        assert_eq!(image_parts(&transport.last_body().unwrap()), 0);
    }

    #[tokio::test]
    async fn test_placeholder_url_never_sent() {
        let (flow, transport) = flow(&config(), vec![Ok(TransportResponse::ok(completion_body(GRADED)))]);
        let request = GradingRequest::new(vec![
            "https://mock-bucket.site/a.png".into(),
            "https://bucket.s3.amazonaws.com/b.png".into(),
        ]);

        flow.grade_submission(&request, 3).await.unwrap();

        let body = transport.last_body().unwrap().to_string();
        assert!(!body.contains("mock-bucket"));
        assert!(body.contains("bucket.s3.amazonaws.com/b.png"));
    }

    #[tokio::test]
    async fn test_reasoning_model_sends_text_only() {
        let config = config().with_model("o1-mini");
        let (flow, transport) = flow(&config, vec![Ok(TransportResponse::ok(completion_body(GRADED)))]);
        let request = GradingRequest::new(vec!["https://bucket.s3.amazonaws.com/b.png".into()]);

        flow.grade_submission(&request, 3).await.unwrap();

        let body = transport.last_body().unwrap();
        assert_eq!(image_parts(&body), 0);
        assert!(body.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_grade_or_degrade_on_auth_error() {
        let (flow, _) = flow(
            &config(),
            vec![Err(GradingError::Api {
                status: 401,
                body: "invalid_api_key".into(),
            })],
        );
        let request = GradingRequest::default().with_question("$2x = 4$");

        let result = flow.grade_or_degrade(&request).await;

        assert_eq!(result.score, 0.0);
        assert!(result.summary.contains("xác thực"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_grade_or_degrade_malformed_with_details() {
        let config = Config {
            development: true,
            ..config()
        };
        let (flow, _) = flow(&config, vec![Ok(TransportResponse::ok(completion_body("not json")))]);
        let request = GradingRequest::default().with_question("$2x = 4$");

        let result = flow.grade_or_degrade(&request).await;

        assert_eq!(result.error.unwrap().kind, "malformed_response");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_retry_loop() {
        let config = Config {
            grading_timeout_secs: 5,
            ..config()
        };
        let (flow, transport) = flow(
            &config,
            vec![
                Ok(TransportResponse::rate_limited(Some("60"))),
                Ok(TransportResponse::ok(completion_body(GRADED))),
            ],
        );
        let request = GradingRequest::default().with_question("$2x = 4$");

        let err = flow.grade_submission(&request, 3).await.unwrap_err();

        assert!(matches!(err, GradingError::TimedOut(5)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_backoff() {
        let (flow, transport) = flow(
            &config(),
            vec![
                Ok(TransportResponse::rate_limited(Some("10"))),
                Ok(TransportResponse::ok(completion_body(GRADED))),
            ],
        );
        let request = GradingRequest::default().with_question("$2x = 4$");

        let err = flow
            .grade_submission_until(
                &request,
                3,
                tokio::time::sleep(Duration::from_millis(500)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, GradingError::Cancelled));
        assert_eq!(transport.calls(), 1);
    }
}
