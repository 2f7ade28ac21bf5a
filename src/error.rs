use thiserror::Error;

/// 评分流程错误
#[derive(Debug, Error)]
pub enum GradingError {
    /// 题目文本、标准答案文本和学生图片全部为空
    #[error("评分请求无效: 题目文本、标准答案或学生图片至少需要提供一项")]
    EmptyRequest,

    /// 本地图片读取失败（单张图片级别，会被吸收）
    #[error("无法读取图片文件 {path}: {source}")]
    ImageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 占位/测试图片 URL（单张图片级别，会被吸收）
    #[error("跳过占位图片 URL: {url}")]
    PlaceholderUrl { url: String },

    /// 请求频率限制，重试次数已用尽
    #[error("LLM API 请求频率限制 (429)，已尝试 {attempts} 次")]
    RateLimited {
        attempts: u32,
        retry_after: Option<String>,
    },

    /// LLM API 返回非成功状态码
    #[error("LLM API 返回错误响应 (状态码 {status}): {body}")]
    Api { status: u16, body: String },

    /// 网络层错误（连接失败、超时等）
    #[error("LLM API 请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    /// 构建请求消息失败
    #[error("构建 LLM 请求失败: {0}")]
    RequestBuild(#[from] async_openai::error::OpenAIError),

    /// 请求体序列化失败
    #[error("请求体序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    /// AI 返回内容不是合法 JSON，或字段类型不符
    #[error("AI 响应格式错误 (JSON): {0}")]
    MalformedResponse(String),

    /// AI 返回内容缺少必需字段
    #[error("AI 响应缺少必需字段: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// 整个评分调用超时
    #[error("AI 评分超时 ({0} 秒)")]
    TimedOut(u64),

    /// 调用方取消
    #[error("AI 评分已取消")]
    Cancelled,
}

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    ImageResolution,
    RateLimit,
    Transport,
    MalformedResponse,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::ImageResolution => "image_resolution",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Transport => "transport",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl GradingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GradingError::EmptyRequest
            | GradingError::RequestBuild(_)
            | GradingError::Serialize(_) => ErrorKind::InvalidRequest,
            GradingError::ImageRead { .. } | GradingError::PlaceholderUrl { .. } => {
                ErrorKind::ImageResolution
            }
            GradingError::RateLimited { .. } => ErrorKind::RateLimit,
            GradingError::Api { status: 429, .. } => ErrorKind::RateLimit,
            GradingError::Api { .. } | GradingError::Transport(_) | GradingError::TimedOut(_) => {
                ErrorKind::Transport
            }
            GradingError::MalformedResponse(_) | GradingError::MissingFields(_) => {
                ErrorKind::MalformedResponse
            }
            GradingError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// 是否属于频率限制：429 状态码，或网络层错误信息中包含 "429" / "rate limit"
    ///
    /// 响应体不参与判断
    pub fn is_rate_limited(&self) -> bool {
        match self {
            GradingError::RateLimited { .. } => true,
            GradingError::Api { status, .. } => *status == 429,
            GradingError::Transport(e) => {
                let message = e.to_string().to_lowercase();
                message.contains("429") || message.contains("rate limit")
            }
            _ => false,
        }
    }

    /// 对应的 HTTP 状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            GradingError::RateLimited { .. } => Some(429),
            GradingError::Api { status, .. } => Some(*status),
            GradingError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// 是否为连接失败、超时或响应体读取中断
    pub fn is_connectivity(&self) -> bool {
        match self {
            GradingError::Transport(e) => e.is_connect() || e.is_timeout() || e.is_body(),
            GradingError::TimedOut(_) => true,
            _ => false,
        }
    }
}

// ========== 便捷构造函数 ==========

impl GradingError {
    pub fn image_read(path: impl Into<String>, source: std::io::Error) -> Self {
        GradingError::ImageRead {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        GradingError::MalformedResponse(detail.to_string())
    }
}

/// 评分流程结果类型
pub type Result<T> = std::result::Result<T, GradingError>;
