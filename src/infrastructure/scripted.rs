//! 按脚本回放响应的传输实现，用于测试调度与重试逻辑

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{GradingError, Result};
use crate::infrastructure::transport::{ChatTransport, TransportResponse};

pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse>>>,
    bodies: Mutex<Vec<JsonValue>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<TransportResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            bodies: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的请求次数
    pub fn calls(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }

    /// 最近一次请求体
    pub fn last_body(&self) -> Option<JsonValue> {
        self.bodies.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn post_chat(&self, body: &JsonValue) -> Result<TransportResponse> {
        self.bodies.lock().unwrap().push(body.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GradingError::malformed("脚本响应已耗尽")))
    }
}

/// 构造一个 chat completion 响应体
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}
