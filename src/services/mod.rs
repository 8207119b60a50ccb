pub mod archive_service;
pub mod llm_service;
pub mod pdf_service;
pub mod quiz_sanitizer;
pub mod quiz_service;
