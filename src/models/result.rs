use serde::{Deserialize, Serialize};

/// 练习题（题目与解答分开存放）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PracticeProblem {
    pub problem: String,
    pub solution: String,
}

/// 练习题集：相似题与补救题（期望各 4 道，不做强制校验）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PracticeSets {
    #[serde(default)]
    pub similar: Vec<PracticeProblem>,
    #[serde(default)]
    pub remedial: Vec<PracticeProblem>,
}

/// 降级结果附带的错误详情（仅开发模式）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub status: Option<u16>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// AI 评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GradingResult {
    pub summary: String,
    /// 0-10 分
    pub score: f64,
    #[serde(default)]
    pub mistakes: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub practice_sets: PracticeSets,
    #[serde(rename = "_error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl GradingResult {
    /// 零分结果（未配置、降级等场景）
    pub fn zero(summary: impl Into<String>, next_steps: Vec<String>) -> Self {
        Self {
            summary: summary.into(),
            score: 0.0,
            mistakes: Vec::new(),
            next_steps,
            practice_sets: PracticeSets::default(),
            error: None,
        }
    }

    /// 未配置 API 密钥时返回的占位结果
    pub fn not_configured() -> Self {
        Self::zero(
            "AI grading not configured. Please set OPENAI_API_KEY.",
            vec!["Configure OpenAI API key to enable AI grading".to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let result: GradingResult = serde_json::from_str(
            r#"{
                "summary": "Đúng",
                "score": 8,
                "mistakes": ["Thiếu bước kiểm tra nghiệm"],
                "nextSteps": ["Luyện thêm"],
                "practiceSets": {
                    "similar": [{"problem": "$x^2 - 7x + 12 = 0$", "solution": "$x = 3$"}],
                    "remedial": []
                }
            }"#,
        )
        .unwrap();
        assert_eq!(result.score, 8.0);
        assert_eq!(result.next_steps, vec!["Luyện thêm".to_string()]);
        assert_eq!(result.practice_sets.similar.len(), 1);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = serde_json::from_str::<GradingResult>(
            r#"{"summary": "ok", "score": 5, "grade": "B"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown field `grade`"));
    }

    #[test]
    fn test_error_detail_serialized_only_when_present() {
        let json = serde_json::to_value(GradingResult::not_configured()).unwrap();
        assert!(json.get("_error").is_none());
        assert_eq!(json["score"], 0.0);
        assert_eq!(json["practiceSets"]["similar"], serde_json::json!([]));
    }
}
