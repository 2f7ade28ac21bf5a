/// 模型能力类型
///
/// 在加载配置时解析一次，之后的调用不再根据模型名称做字符串判断
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    /// 支持图片输入和 temperature 参数的普通模型
    Vision,
    /// 推理模型：只接受文本，不接受 temperature
    Reasoning,
}

impl ModelKind {
    /// 根据模型名称推断能力类型
    pub fn detect(model_name: &str) -> Self {
        if model_name.starts_with("o1") {
            ModelKind::Reasoning
        } else {
            ModelKind::Vision
        }
    }

    /// 从显式配置值解析（`reasoning` / `vision`）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "reasoning" => Some(ModelKind::Reasoning),
            "vision" => Some(ModelKind::Vision),
            _ => None,
        }
    }

    pub fn accepts_images(self) -> bool {
        matches!(self, ModelKind::Vision)
    }

    pub fn accepts_temperature(self) -> bool {
        matches!(self, ModelKind::Vision)
    }
}

/// 默认的占位图片 URL 黑名单
pub const DEFAULT_PLACEHOLDER_PATTERNS: [&str; 4] =
    ["example.com", "placeholder", "mock", "test.com/test"];

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时评分的提交数量
    pub max_concurrent_submissions: usize,
    /// 待评分的 TOML 文件目录
    pub submissions_folder: String,
    /// 评分结果输出目录
    pub results_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件
    pub output_log_file: String,
    /// 降级评分记录文件
    pub failure_log_file: String,
    /// 开发模式：在降级结果中附带错误详情，并输出请求载荷
    pub development: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub model_kind: ModelKind,
    pub temperature: f32,
    /// 遇到 429 时的最大重试次数（总尝试次数 = max_retries + 1）
    pub max_retries: u32,
    /// 单次 HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
    /// 整个评分调用的超时（秒）
    pub grading_timeout_secs: u64,
    /// 占位图片 URL 黑名单（小写子串匹配）
    pub placeholder_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let llm_model_name = "gpt-4o-mini".to_string();
        Self {
            max_concurrent_submissions: 4,
            submissions_folder: "submissions".to_string(),
            results_folder: "results".to_string(),
            verbose_logging: false,
            output_log_file: "grading_output.txt".to_string(),
            failure_log_file: "grading_failures.txt".to_string(),
            development: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            model_kind: ModelKind::detect(&llm_model_name),
            llm_model_name,
            temperature: 0.7,
            max_retries: 3,
            http_timeout_secs: 60,
            grading_timeout_secs: 180,
            placeholder_patterns: DEFAULT_PLACEHOLDER_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        let llm_model_name = std::env::var("OPENAI_MODEL").unwrap_or(default.llm_model_name);
        let model_kind = std::env::var("OPENAI_MODEL_KIND")
            .ok()
            .and_then(|v| ModelKind::parse(&v))
            .unwrap_or_else(|| ModelKind::detect(&llm_model_name));
        Self {
            max_concurrent_submissions: std::env::var("MAX_CONCURRENT_SUBMISSIONS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_concurrent_submissions),
            submissions_folder: std::env::var("SUBMISSIONS_FOLDER").unwrap_or(default.submissions_folder),
            results_folder: std::env::var("RESULTS_FOLDER").unwrap_or(default.results_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            failure_log_file: std::env::var("FAILURE_LOG_FILE").unwrap_or(default.failure_log_file),
            development: std::env::var("APP_ENV").map(|v| v == "development").unwrap_or(default.development),
            llm_api_key: std::env::var("OPENAI_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name,
            model_kind,
            temperature: std::env::var("OPENAI_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.temperature),
            max_retries: std::env::var("GRADING_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_retries),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.http_timeout_secs),
            grading_timeout_secs: std::env::var("GRADING_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.grading_timeout_secs),
            placeholder_patterns: std::env::var("PLACEHOLDER_URL_PATTERNS").ok().map(|v| parse_patterns(&v)).unwrap_or(default.placeholder_patterns),
        }
    }

    /// 切换模型，并重新解析模型能力
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.llm_model_name = model_name.into();
        self.model_kind = ModelKind::detect(&self.llm_model_name);
        self
    }

    /// 是否已配置 API 密钥
    pub fn has_api_key(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }
}

fn parse_patterns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}
