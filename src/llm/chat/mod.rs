pub mod gemini;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use super::{ LlmConfig, LlmError };
use self::gemini::GeminiChatClient;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// `user` stays `user`; every other caller role is the model's own turn.
    pub fn from_caller(role: &str) -> Self {
        if role == "user" { Role::User } else { Role::Model }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ContentPart {
    #[serde(rename_all = "camelCase")] InlineData {
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentPart::InlineData {
            inline_data: InlineData { mime_type: mime_type.into(), data: data.into() },
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

/// One conversational exchange: a session seeded with `history`, then
/// `message` submitted as the new user turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system_instruction: String,
    pub history: Vec<Content>,
    pub message: Vec<ContentPart>,
    pub response_mime_type: Option<String>,
    pub response_schema: Option<JsonValue>,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(&self, request: ChatRequest) -> Result<String, LlmError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    let client: Arc<dyn ChatClient> = Arc::new(GeminiChatClient::from_config(config)?);
    Ok(client)
}
