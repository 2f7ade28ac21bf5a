//! 降级评分结果
//!
//! 评分失败时不让提交失败，而是返回带提示信息的零分结果

use crate::error::{ErrorKind, GradingError};
use crate::models::{ErrorDetail, GradingResult};

/// 根据错误类型生成降级结果（越南语提示）
///
/// `expose_details` 为 true 时附带错误详情（开发模式）
pub fn degraded_result(err: &GradingError, expose_details: bool) -> GradingResult {
    let (summary, next_steps) = degraded_message(err);
    let mut result = GradingResult::zero(
        summary,
        next_steps.iter().map(|s| s.to_string()).collect(),
    );

    if expose_details {
        result.error = Some(ErrorDetail {
            status: err.status(),
            message: err.to_string(),
            kind: err.kind().as_str().to_string(),
        });
    }

    result
}

fn degraded_message(err: &GradingError) -> (&'static str, &'static [&'static str]) {
    if err.is_rate_limited() {
        return (
            "AI grading tạm thời không khả dụng do quá tải. Vui lòng thử lại sau.",
            &["Vui lòng thử lại sau vài phút"],
        );
    }

    match err.status() {
        Some(401) => (
            "Lỗi xác thực API. Vui lòng kiểm tra API key.",
            &["Kiểm tra cấu hình OPENAI_API_KEY trong file .env"],
        ),
        Some(400) => (
            "Yêu cầu không hợp lệ. Vui lòng kiểm tra dữ liệu đầu vào.",
            &["Kiểm tra format của hình ảnh và dữ liệu assignment"],
        ),
        Some(500) | Some(502) | Some(503) => (
            "Lỗi từ phía server AI. Vui lòng thử lại sau.",
            &["Thử lại sau vài phút", "Nếu vẫn lỗi, liên hệ quản trị viên"],
        ),
        _ if err.is_connectivity() => (
            "Không thể kết nối đến server AI. Vui lòng kiểm tra kết nối mạng.",
            &["Kiểm tra kết nối internet", "Thử lại sau"],
        ),
        _ if err.kind() == ErrorKind::MalformedResponse => (
            "Lỗi xử lý phản hồi từ AI. Dữ liệu không hợp lệ.",
            &["Thử lại với submission khác"],
        ),
        _ => (
            "AI grading failed",
            &["Hệ thống đang gặp sự cố. Vui lòng liên hệ quản trị viên."],
        ),
    }
}
