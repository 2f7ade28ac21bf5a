pub mod fallback;
pub mod grading_flow;
pub mod submission_ctx;

pub use fallback::degraded_result;
pub use grading_flow::GradingFlow;
pub use submission_ctx::SubmissionCtx;
