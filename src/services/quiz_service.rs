use crate::config::{Config, DEFAULT_MAX_ATTEMPTS};
use crate::error::{Error, Result};
use crate::models::quiz::{Quiz, QuizItem, QUESTIONS_PER_QUIZ};
use crate::prompts::build_quiz_prompt;
use crate::services::archive_service::QuizArchive;
use crate::services::llm_service::{GenerationSettings, LlmClient};
use crate::services::quiz_sanitizer::{validate_and_fix, Rejected};
use crate::utils::json_extract::extract_json_array;
use crate::utils::json_repair::repair_json;
use crate::utils::text::preview;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_SUBJECT: &str = "the provided text";

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPolicy {
    pub max_attempts: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            temperature: 0.3,
            timeout: Duration::from_secs(45),
        }
    }
}

impl From<&Config> for GenerationPolicy {
    fn from(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            temperature: config.temperature,
            timeout: config.llm_timeout,
        }
    }
}

/// Why a single attempt produced nothing usable.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptFailure {
    EmptyResponse,
    NoJsonArray,
    MalformedJson(String),
    StructurallyInvalid(Rejected),
    Upstream(String),
    Timeout,
}

impl AttemptFailure {
    pub fn tag(&self) -> &'static str {
        match self {
            AttemptFailure::EmptyResponse => "empty_response",
            AttemptFailure::NoJsonArray => "no_json_array",
            AttemptFailure::MalformedJson(_) => "malformed_json",
            AttemptFailure::StructurallyInvalid(_) => "structurally_invalid",
            AttemptFailure::Upstream(_) => "upstream_error",
            AttemptFailure::Timeout => "timeout",
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::MalformedJson(detail) | AttemptFailure::Upstream(detail) => {
                write!(f, "{}: {}", self.tag(), detail)
            }
            AttemptFailure::StructurallyInvalid(rejected) => {
                write!(f, "{}: {}", self.tag(), rejected)
            }
            _ => f.write_str(self.tag()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Parsed(Vec<QuizItem>),
    Failed(AttemptFailure),
}

/// Next step of the generation loop after one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// At least a full quiz worth of items; extras get dropped.
    Accept(Vec<QuizItem>),
    Retry(String),
    /// Short batch on the last attempt; fillers make up the difference.
    Pad(Vec<QuizItem>),
    Fail(AttemptFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptState {
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
}

impl AttemptState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt_count: 0,
            max_attempts: max_attempts.max(1),
            last_error: None,
        }
    }

    pub fn is_final_attempt(&self) -> bool {
        self.attempt_count >= self.max_attempts
    }
}

pub fn decide(outcome: AttemptOutcome, state: &AttemptState) -> Transition {
    match outcome {
        AttemptOutcome::Failed(failure) if state.is_final_attempt() => Transition::Fail(failure),
        AttemptOutcome::Failed(failure) => Transition::Retry(failure.to_string()),
        AttemptOutcome::Parsed(items) if items.len() >= QUESTIONS_PER_QUIZ => {
            Transition::Accept(items)
        }
        AttemptOutcome::Parsed(items) if state.is_final_attempt() => Transition::Pad(items),
        AttemptOutcome::Parsed(items) => Transition::Retry(format!(
            "short_batch: {} of {} questions",
            items.len(),
            QUESTIONS_PER_QUIZ
        )),
    }
}

/// Runs the text side of one attempt: extract, repair, parse, validate.
pub fn normalize_response(raw: &str) -> AttemptOutcome {
    if raw.trim().is_empty() {
        return AttemptOutcome::Failed(AttemptFailure::EmptyResponse);
    }
    let Some(candidate) = extract_json_array(raw) else {
        return AttemptOutcome::Failed(AttemptFailure::NoJsonArray);
    };
    let repaired = repair_json(candidate);
    let parsed: serde_json::Value = match serde_json::from_str(&repaired) {
        Ok(value) => value,
        Err(e) => return AttemptOutcome::Failed(AttemptFailure::MalformedJson(e.to_string())),
    };
    match validate_and_fix(&parsed) {
        Ok(items) => AttemptOutcome::Parsed(items),
        Err(rejected) => AttemptOutcome::Failed(AttemptFailure::StructurallyInvalid(rejected)),
    }
}

#[derive(Clone)]
pub struct QuizService {
    llm: Arc<dyn LlmClient>,
    archive: QuizArchive,
    policy: GenerationPolicy,
}

impl QuizService {
    pub fn new(llm: Arc<dyn LlmClient>, archive: QuizArchive, policy: GenerationPolicy) -> Self {
        Self {
            llm,
            archive,
            policy,
        }
    }

    /// Generates a ten-question quiz over `source_text`, retrying within the
    /// attempt budget until the model produces a usable batch.
    pub async fn generate_quiz(&self, source_text: &str, topic: Option<&str>) -> Result<Quiz> {
        let topic = topic.map(str::trim).filter(|t| !t.is_empty());
        let subject = topic.unwrap_or(DEFAULT_SUBJECT);
        let prompt = build_quiz_prompt(source_text, topic);
        let settings = GenerationSettings::permissive(self.policy.temperature);
        let mut state = AttemptState::new(self.policy.max_attempts);

        loop {
            state.attempt_count += 1;
            let outcome = self.run_attempt(&prompt, &settings, &state).await;

            match decide(outcome, &state) {
                Transition::Accept(items) => {
                    tracing::info!(
                        attempt = state.attempt_count,
                        items = items.len(),
                        "Quiz accepted"
                    );
                    return Ok(self.finish(items, subject).await);
                }
                Transition::Pad(items) => {
                    tracing::warn!(
                        attempt = state.attempt_count,
                        items = items.len(),
                        "Padding short quiz on final attempt"
                    );
                    return Ok(self.finish(items, subject).await);
                }
                Transition::Retry(reason) => {
                    tracing::warn!(
                        attempt = state.attempt_count,
                        max_attempts = state.max_attempts,
                        reason = %reason,
                        "Retrying quiz generation"
                    );
                    state.last_error = Some(reason);
                }
                Transition::Fail(failure) => {
                    tracing::error!(
                        attempt = state.attempt_count,
                        reason = failure.tag(),
                        previous = ?state.last_error,
                        "Quiz generation failed"
                    );
                    return Err(Error::AttemptsExhausted {
                        attempts: state.attempt_count,
                        last_error: failure.to_string(),
                    });
                }
            }
        }
    }

    async fn run_attempt(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
        state: &AttemptState,
    ) -> AttemptOutcome {
        tracing::debug!(
            attempt = state.attempt_count,
            max_attempts = state.max_attempts,
            "Requesting quiz from model"
        );

        // A panic inside the client is contained to this attempt's task.
        let llm = Arc::clone(&self.llm);
        let prompt = prompt.to_string();
        let settings = settings.clone();
        let mut call = tokio::spawn(async move { llm.generate(&prompt, &settings).await });

        let raw = match tokio::time::timeout(self.policy.timeout, &mut call).await {
            Ok(Ok(Ok(raw))) => raw,
            Ok(Ok(Err(e))) => {
                return AttemptOutcome::Failed(AttemptFailure::Upstream(e.to_string()))
            }
            Ok(Err(join_err)) => {
                tracing::error!(
                    attempt = state.attempt_count,
                    error = %join_err,
                    "Model call aborted"
                );
                return AttemptOutcome::Failed(AttemptFailure::Upstream(format!(
                    "model call aborted: {}",
                    join_err
                )));
            }
            Err(_) => {
                call.abort();
                return AttemptOutcome::Failed(AttemptFailure::Timeout);
            }
        };

        let outcome = normalize_response(&raw);
        if let AttemptOutcome::Failed(failure) = &outcome {
            tracing::warn!(
                attempt = state.attempt_count,
                reason = failure.tag(),
                raw = %preview(&raw),
                "Model reply unusable"
            );
        }
        outcome
    }

    async fn finish(&self, items: Vec<QuizItem>, subject: &str) -> Quiz {
        let quiz = Quiz::complete(items, subject);
        self.archive.save_best_effort(&quiz).await;
        quiz
    }
}
