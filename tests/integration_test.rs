use math_grader::{Config, GradingError, GradingFlow, GradingRequest, ImageRef};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> Config {
    Config {
        llm_api_key: "sk-integration".to_string(),
        llm_api_base_url: format!("{}/v1", server.uri()),
        ..Config::default()
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn request() -> GradingRequest {
    GradingRequest::new(vec![ImageRef::parse("https://bucket.s3.amazonaws.com/work.png")])
        .with_question("Giải phương trình $x^2 - 5x + 6 = 0$")
        .with_model_solution("$x = 2$ hoặc $x = 3$")
}

#[tokio::test]
async fn test_grades_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-integration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"summary":"Lời giải đúng","score":8.5,"mistakes":["Thiếu kiểm tra nghiệm"],"nextSteps":["Luôn thử lại nghiệm"],"practiceSets":{"similar":[{"problem":"$x^2 - 7x + 12 = 0$","solution":"$x = 3$ hoặc $x = 4$"}],"remedial":[]}}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let flow = GradingFlow::new(&config(&server)).unwrap();
    let result = flow.grade_submission(&request(), 3).await.unwrap();

    assert_eq!(result.score, 8.5);
    assert_eq!(result.mistakes, vec!["Thiếu kiểm tra nghiệm".to_string()]);
    assert_eq!(result.practice_sets.similar.len(), 1);

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["role"], "system");
    let parts = body["messages"][1]["content"].as_array().unwrap();
    assert!(parts
        .iter()
        .any(|p| p["image_url"]["url"] == "https://bucket.s3.amazonaws.com/work.png"));
}

#[tokio::test]
async fn test_retries_after_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(r#"{"summary":"Tốt","score":6}"#)),
        )
        .mount(&server)
        .await;

    let flow = GradingFlow::new(&config(&server)).unwrap();
    let result = flow.grade_submission(&request(), 2).await.unwrap();

    assert_eq!(result.score, 6.0);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rate_limit_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .mount(&server)
        .await;

    let flow = GradingFlow::new(&config(&server)).unwrap();
    let err = flow.grade_submission(&request(), 1).await.unwrap_err();

    assert!(matches!(err, GradingError::RateLimited { attempts: 2, .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_auth_failure_degrades() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_api_key"))
        .expect(1)
        .mount(&server)
        .await;

    let flow = GradingFlow::new(&config(&server)).unwrap();
    let result = flow.grade_or_degrade(&request()).await;

    assert_eq!(result.score, 0.0);
    assert_eq!(result.summary, "Lỗi xác thực API. Vui lòng kiểm tra API key.");
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_no_api_key_makes_no_request() {
    let server = MockServer::start().await;
    let config = Config {
        llm_api_key: String::new(),
        ..config(&server)
    };

    let flow = GradingFlow::new(&config).unwrap();
    let result = flow.grade_submission(&request(), 3).await.unwrap();

    assert_eq!(result.score, 0.0);
    assert!(server.received_requests().await.unwrap().is_empty());
}
