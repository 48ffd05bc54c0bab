use serde::{ Serialize, Deserialize };

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    pub content: String,
}

/// One turn of the caller's conversation. `image` is a
/// `data:<mime>;base64,<payload>` URI when present.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub existing_files: Vec<FileNode>,
    pub chat_history: Vec<ChatMessage>,
}

/// The model's reply: always the complete project state, never a diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub explanation: String,
    pub files: Vec<FileNode>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub last_user_prompt: String,
    pub last_model_explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FollowUpResponse {
    pub question: String,
}
