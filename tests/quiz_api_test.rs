mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::*;
use serde_json::json;

#[tokio::test]
async fn root_reports_liveness() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(ScriptedLlm::new(vec![]), FakeExtractor::new(""), tmp.path());

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "QuizCraft API is running!");
}

#[tokio::test]
async fn health_reports_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(ScriptedLlm::new(vec![]), FakeExtractor::new(""), tmp.path());

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn text_input_yields_ten_valid_questions() {
    let tmp = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![quiz_reply(10)]);
    let app = app(llm.clone(), FakeExtractor::new(""), tmp.path());

    let req = json_request(
        "/generate-quiz",
        &json!({ "text": "Photosynthesis converts light energy into chemical energy." }),
    );
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_valid_quiz(&body);
    assert_eq!(llm.calls(), 1);
    assert!(llm.prompts()[0].contains("Photosynthesis converts light energy"));
}

#[tokio::test]
async fn short_batch_on_last_attempt_is_padded_with_topic() {
    let tmp = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![
        "no quiz here".to_string(),
        "still nothing".to_string(),
        quiz_reply(7),
    ]);
    let app = app(llm.clone(), FakeExtractor::new(""), tmp.path());

    let req = json_request(
        "/generate-quiz",
        &json!({ "text": "The water cycle.", "topic": "Hydrology" }),
    );
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_valid_quiz(&body);
    assert_eq!(llm.calls(), 3);
    assert_eq!(body[7]["question"], "Additional question about Hydrology?");
    assert_eq!(body[9]["correct"], "Option A");
    assert!(llm.prompts()[0].contains("Hydrology"));
}

#[tokio::test]
async fn missing_text_field_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![quiz_reply(10)]);
    let app = app(llm.clone(), FakeExtractor::new(""), tmp.path());

    let (status, body) = send(&app, json_request("/generate-quiz", &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing 'text' field");
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn blank_text_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![quiz_reply(10)]);
    let app = app(llm.clone(), FakeExtractor::new(""), tmp.path());

    let (status, body) = send(
        &app,
        json_request("/generate-quiz", &json!({ "text": "   \n\t " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Text input cannot be empty");
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(ScriptedLlm::new(vec![]), FakeExtractor::new(""), tmp.path());

    let req = Request::builder()
        .method("POST")
        .uri("/generate-quiz")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unparseable_replies_exhaust_attempts() {
    let tmp = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![
        "I cannot help with that.".to_string(),
        "[{\"question\": \"Broken".to_string(),
        String::new(),
    ]);
    let app = app(llm.clone(), FakeExtractor::new(""), tmp.path());

    let (status, body) = send(
        &app,
        json_request("/generate-quiz", &json!({ "text": "Cell biology basics." })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate quiz after multiple attempts");
    assert_eq!(llm.calls(), 3);
}

#[tokio::test]
async fn sloppy_json_is_repaired() {
    let tmp = tempfile::tempdir().unwrap();
    let items: Vec<String> = (1..=10)
        .map(|i| {
            format!(
                "{{question: \u{201C}Question {}?\u{201D}, choices: [\"a\", \"b\", \"c\", \"d\",], answer: \"c\",}}",
                i
            )
        })
        .collect();
    let reply = format!("Here you go: [{}]", items.join(", "));
    let llm = ScriptedLlm::new(vec![reply]);
    let app = app(llm.clone(), FakeExtractor::new(""), tmp.path());

    let (status, body) = send(
        &app,
        json_request("/generate-quiz", &json!({ "text": "Anything." })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_valid_quiz(&body);
    assert_eq!(body[0]["correct"], "c");
    assert_eq!(llm.calls(), 1);
}
