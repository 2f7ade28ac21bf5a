//! # Math Grader
//!
//! 使用多模态 LLM 对学生手写数学作答进行 AI 评分
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有网络资源，只暴露能力
//! - `ChatTransport` - 发送 chat completion 请求，`HttpTransport` 为 reqwest 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个请求
//! - `ImageResolver` - 图片引用 → 可发送的 URL / data URI
//! - `ContentAssembler` - 拼装带标签的多模态内容
//! - `RequestDispatcher` - 构建请求体，频率限制时退避重试
//! - `ResponseValidator` - 解析并校验评分 JSON
//! - `FailureLog` - 写降级记录
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份提交"的完整评分流程
//! - `SubmissionCtx` - 上下文封装（作业 + 学生）
//! - `GradingFlow` - 流程编排（assemble → dispatch → validate），超时与取消
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量评分，管理并发
//! - `orchestrator/submission_processor` - 单份提交评分与结果输出

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, ModelKind};
pub use error::{ErrorKind, GradingError, Result};
pub use infrastructure::{ChatTransport, HttpTransport, TransportResponse};
pub use models::{GradingRequest, GradingResult, ImageRef, Submission, SubmissionDraft};
pub use orchestrator::{App, RunStats};
pub use workflow::{degraded_result, GradingFlow, SubmissionCtx};
