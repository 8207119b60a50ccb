use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub text: Option<String>,
    pub topic: Option<String>,
}
