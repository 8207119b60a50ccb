#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use quizcraft_backend::{
    build_router,
    config::UploadSettings,
    services::{
        archive_service::QuizArchive,
        llm_service::{GenerationSettings, LlmClient, LlmError},
        pdf_service::TextExtractor,
        quiz_service::GenerationPolicy,
    },
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

pub const BOUNDARY: &str = "quizcraft-test-boundary";

/// Model double that replays canned replies and records every prompt.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        prompt: &str,
        _settings: &GenerationSettings,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Extractor double that returns fixed text and notes whether the uploaded
/// file was on disk when it was asked to read it.
pub struct FakeExtractor {
    text: String,
    seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl FakeExtractor {
    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            text: text.into(),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract_text(&self, path: &Path) -> quizcraft_backend::error::Result<String> {
        self.seen
            .lock()
            .unwrap()
            .push((path.to_path_buf(), path.exists()));
        Ok(self.text.clone())
    }
}

pub fn quiz_reply(count: usize) -> String {
    let items: Vec<JsonValue> = (1..=count)
        .map(|i| {
            json!({
                "question": format!("What does step {} produce?", i),
                "options": ["Glucose", "Oxygen", "Water", "Carbon dioxide"],
                "correct": "Oxygen"
            })
        })
        .collect();
    format!(
        "Sure! Here are your questions:\n```json\n{}\n```",
        serde_json::to_string_pretty(&items).unwrap()
    )
}

pub fn app(llm: Arc<ScriptedLlm>, extractor: Arc<FakeExtractor>, temp_dir: &Path) -> Router {
    let state = AppState::from_parts(
        llm,
        extractor,
        QuizArchive::disabled(),
        GenerationPolicy {
            max_attempts: 3,
            temperature: 0.3,
            timeout: Duration::from_secs(5),
        },
        UploadSettings {
            temp_dir: temp_dir.to_path_buf(),
            ..UploadSettings::default()
        },
    );
    build_router(state)
}

pub fn json_request(uri: &str, body: &JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        data: Vec<u8>,
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_request(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                        name, value
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn pdf_bytes(len: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(len.max(data.len()), b'0');
    data
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, body)
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

/// Checks the shape every successful response must have.
pub fn assert_valid_quiz(body: &JsonValue) {
    let items = body.as_array().expect("quiz is an array");
    assert_eq!(items.len(), 10);
    for item in items {
        assert!(item["question"].as_str().is_some_and(|q| !q.is_empty()));
        let options: Vec<&str> = item["options"]
            .as_array()
            .expect("options array")
            .iter()
            .map(|o| o.as_str().expect("string option"))
            .collect();
        assert_eq!(options.len(), 4);
        let correct = item["correct"].as_str().expect("string answer");
        assert!(options.contains(&correct));
    }
}
