pub mod chat;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0}")]
    Config(String),
    #[error("Request to model service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Model service returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
    },
    #[error("Model service returned no content{}", .0.as_deref().map(|r| format!(" (reason: {})", r)).unwrap_or_default())]
    EmptyResponse(Option<String>),
}
