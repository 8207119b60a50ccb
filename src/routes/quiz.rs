use crate::{
    config::UploadSettings,
    dto::quiz_dto::GenerateQuizRequest,
    error::{Error, Result},
    models::quiz::Quiz,
    utils::text::truncate_chars,
    AppState,
};
use axum::{
    extract::{multipart::Field, multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

const PDF_MAGIC: &[u8] = b"%PDF";

#[axum::debug_handler]
pub async fn generate_quiz(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateQuizRequest>, JsonRejection>,
) -> Result<Json<Quiz>> {
    let Json(req) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;

    let text = req
        .text
        .ok_or_else(|| Error::BadRequest("Missing 'text' field".to_string()))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::BadRequest("Text input cannot be empty".to_string()));
    }

    tracing::info!(chars = text.chars().count(), "Generating quiz from text");
    let quiz = state
        .quiz_service
        .generate_quiz(text, req.topic.as_deref())
        .await?;
    Ok(Json(quiz))
}

/// Uploaded PDF held in a temporary file. The file is removed when this
/// value is dropped.
struct PdfUpload {
    file: NamedTempFile,
    size: usize,
}

#[axum::debug_handler]
pub async fn generate_quiz_from_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Quiz>> {
    let limits = &state.uploads;
    let mut upload: Option<PdfUpload> = None;
    let mut topic: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limits))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "pdf" => upload = Some(receive_pdf(field, limits).await?),
            "topic" => {
                topic = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, limits))?,
                )
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| Error::BadRequest("No PDF file provided".to_string()))?;
    if upload.size == 0 {
        return Err(Error::BadRequest("Uploaded PDF is empty".to_string()));
    }

    tracing::info!(bytes = upload.size, "Extracting text from uploaded PDF");
    let extracted = state
        .text_extractor
        .extract_text(upload.file.path())
        .await?;
    drop(upload);

    if extracted.trim().is_empty() {
        return Err(Error::BadRequest(
            "Could not extract text from PDF".to_string(),
        ));
    }
    let text = truncate_chars(extracted.trim(), limits.text_limit);

    let quiz = state
        .quiz_service
        .generate_quiz(text, topic.as_deref())
        .await?;
    Ok(Json(quiz))
}

/// Streams the `pdf` field into a temporary file, enforcing the size ceiling
/// as bytes arrive.
async fn receive_pdf(mut field: Field<'_>, limits: &UploadSettings) -> Result<PdfUpload> {
    let filename = field.file_name().unwrap_or_default().to_string();
    if filename.trim().is_empty() {
        return Err(Error::BadRequest("No file selected".to_string()));
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(Error::BadRequest("File must be a PDF".to_string()));
    }

    let file = tempfile::Builder::new()
        .prefix("quizcraft-upload-")
        .suffix(".pdf")
        .tempfile_in(&limits.temp_dir)?;
    let mut out = tokio::fs::File::from_std(file.reopen()?);
    let mut head: Vec<u8> = Vec::with_capacity(PDF_MAGIC.len());
    let mut size = 0usize;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, limits))?
    {
        size += chunk.len();
        if size > limits.max_bytes {
            tracing::warn!(filename = %filename, "Rejecting oversized PDF upload");
            return Err(too_large(limits));
        }
        if head.len() < PDF_MAGIC.len() {
            let take = (PDF_MAGIC.len() - head.len()).min(chunk.len());
            head.extend_from_slice(&chunk[..take]);
        }
        out.write_all(&chunk).await?;
    }
    out.flush().await?;

    if size > 0 && head != PDF_MAGIC {
        return Err(Error::BadRequest("Invalid PDF file content".to_string()));
    }

    Ok(PdfUpload { file, size })
}

fn too_large(limits: &UploadSettings) -> Error {
    Error::BadRequest(format!(
        "PDF file size exceeds {}MB limit",
        limits.max_bytes / (1024 * 1024)
    ))
}

fn multipart_error(err: MultipartError, limits: &UploadSettings) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(limits)
    } else {
        Error::Multipart(err)
    }
}
