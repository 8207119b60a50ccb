use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_PDF_MAX_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_PDF_TEXT_LIMIT: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub google_api_key: String,
    pub gemini_model: String,
    pub max_attempts: u32,
    pub temperature: f32,
    pub llm_timeout: Duration,
    /// `None` disables writing the last accepted quiz to disk.
    pub archive_path: Option<PathBuf>,
    pub pdf_max_bytes: usize,
    pub pdf_text_limit: usize,
    pub pdftotext_bin: String,
    pub upload_tmp_dir: PathBuf,
    pub log_format: LogFormat,
}

/// Limits applied to uploaded documents.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_bytes: usize,
    /// Characters of extracted text passed on to the prompt.
    pub text_limit: usize,
    pub temp_dir: PathBuf,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_PDF_MAX_BYTES,
            text_limit: DEFAULT_PDF_TEXT_LIMIT,
            temp_dir: env::temp_dir(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let max_attempts: u32 = get_env_parse_or("QUIZ_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(Error::Config(
                "QUIZ_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        let archive_path = env::var("QUIZ_ARCHIVE_PATH")
            .unwrap_or_else(|_| "last_generated_quiz.json".to_string());

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:5000"),
            google_api_key: get_env("GOOGLE_API_KEY")?,
            gemini_model: get_env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            max_attempts,
            temperature: get_env_parse_or("QUIZ_TEMPERATURE", 0.3)?,
            llm_timeout: Duration::from_secs(get_env_parse_or("LLM_TIMEOUT_SECS", 45)?),
            archive_path: (!archive_path.trim().is_empty()).then(|| PathBuf::from(archive_path)),
            pdf_max_bytes: get_env_parse_or("PDF_MAX_BYTES", DEFAULT_PDF_MAX_BYTES)?,
            pdf_text_limit: get_env_parse_or("PDF_TEXT_LIMIT", DEFAULT_PDF_TEXT_LIMIT)?,
            pdftotext_bin: get_env_or("PDFTOTEXT_BIN", "pdftotext"),
            upload_tmp_dir: env::var("UPLOAD_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            log_format: parse_log_format(&get_env_or("LOG_FORMAT", "text")),
        })
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            max_bytes: self.pdf_max_bytes,
            text_limit: self.pdf_text_limit,
            temp_dir: self.upload_tmp_dir.clone(),
        }
    }
}

fn parse_log_format(raw: &str) -> LogFormat {
    if raw.trim().eq_ignore_ascii_case("json") {
        LogFormat::Json
    } else {
        LogFormat::Text
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
