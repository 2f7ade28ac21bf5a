//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量评分处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载提交（Vec<SubmissionDraft>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `submission_processor` - 单份提交处理器
//! - 委托 GradingFlow 评分
//! - 失败时生成降级结果并写入降级记录
//! - 写出结果文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<SubmissionDraft>)
//!     ↓
//! submission_processor (处理单份提交)
//!     ↓
//! workflow::GradingFlow (评分流程)
//!     ↓
//! services (能力层：resolve / assemble / dispatch / validate)
//!     ↓
//! infrastructure (基础设施：ChatTransport)
//! ```

pub mod batch_processor;
pub mod submission_processor;

pub use batch_processor::{App, RunStats};
pub use submission_processor::{process_submission, GradeOutcome};
