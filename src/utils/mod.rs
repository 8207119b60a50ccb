pub mod json_extract;
pub mod json_repair;
pub mod text;
