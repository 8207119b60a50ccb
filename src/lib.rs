pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod prompts;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::{Config, UploadSettings};
use crate::error::Error;
use crate::services::{
    archive_service::QuizArchive,
    llm_service::{GeminiClient, LlmClient},
    pdf_service::{PdftotextExtractor, TextExtractor},
    quiz_service::{GenerationPolicy, QuizService},
};
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

/// Room for multipart framing and the `topic` field on top of the PDF itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: QuizService,
    pub text_extractor: Arc<dyn TextExtractor>,
    pub uploads: UploadSettings,
}

impl AppState {
    pub fn new(config: &Config) -> error::Result<Self> {
        let gemini = GeminiClient::new(
            config.google_api_key.clone(),
            config.gemini_model.clone(),
            config.llm_timeout,
        )?;
        tracing::info!(model = gemini.model_name(), "Using Gemini model");

        let quiz_service = QuizService::new(
            Arc::new(gemini),
            QuizArchive::new(config.archive_path.clone()),
            GenerationPolicy::from(config),
        );
        let text_extractor = Arc::new(PdftotextExtractor::new(config.pdftotext_bin.clone()));

        Ok(Self {
            quiz_service,
            text_extractor,
            uploads: config.upload_settings(),
        })
    }

    /// Assembles state from explicit collaborators, e.g. scripted test doubles.
    pub fn from_parts(
        llm: Arc<dyn LlmClient>,
        text_extractor: Arc<dyn TextExtractor>,
        archive: QuizArchive,
        policy: GenerationPolicy,
        uploads: UploadSettings,
    ) -> Self {
        Self {
            quiz_service: QuizService::new(llm, archive, policy),
            text_extractor,
            uploads,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Above the PDF ceiling so oversized uploads reach the handler's own check.
    let body_limit = state.uploads.max_bytes * 2 + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health))
        .route("/generate-quiz", post(routes::quiz::generate_quiz))
        .route(
            "/api/generate-quiz-from-pdf",
            post(routes::quiz::generate_quiz_from_pdf),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(panic = %detail, "Request handler panicked");
    Error::Internal("An unexpected error occurred".to_string()).into_response()
}
