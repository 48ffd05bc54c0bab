use crate::config::prompt::{ code_generation_schema, PromptConfig };
use crate::llm::chat::{ ChatClient, ChatRequest, Content, ContentPart, Role };
use crate::models::chat::{ ChatMessage, FileNode, FollowUpRequest, GenerateRequest, GenerateResponse };

use log::{ debug, error, info, warn };
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

pub const EMPTY_HISTORY_DETAIL: &str = "Chat history cannot be empty.";
pub const EMPTY_TURN_DETAIL: &str = "The latest message must contain text or an image.";
pub const INVALID_JSON_DETAIL: &str = "The AI returned an invalid JSON response.";

const JSON_MIME_TYPE: &str = "application/json";
const LOGGED_REPLY_CHARS: usize = 200;

static DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:(.+);base64,(.+)").expect("data URI pattern is valid")
});

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*\s*(.*)```").expect("code fence pattern is valid")
});

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{}", INVALID_JSON_DETAIL)]
    UpstreamDecode,
    #[error("{0}")]
    Upstream(String),
}

/// Splits a `data:<mime>;base64,<payload>` URI into its mime type and
/// base64 payload. Anything else yields `None`.
pub fn parse_data_uri(uri: &str) -> Option<(String, String)> {
    let caps = DATA_URI.captures(uri)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Builds the text of the new turn. With existing files the whole snapshot is
/// inlined ahead of the request.
pub fn compose_prompt(existing_files: &[FileNode], text: &str) -> Result<String, serde_json::Error> {
    if existing_files.is_empty() {
        return Ok(text.to_string());
    }
    let snapshot = serde_json::to_string_pretty(existing_files)?;
    Ok(
        format!(
            "Here are the current project files:\n\n{}\n\nNow, considering our conversation history, please apply this new request: '{}'",
            snapshot,
            text
        )
    )
}

/// Image part first, then text; each only when present.
pub fn content_parts(image: Option<&str>, text: &str) -> Vec<ContentPart> {
    let mut parts = Vec::with_capacity(2);
    if let Some((mime_type, data)) = image.and_then(parse_data_uri) {
        parts.push(ContentPart::inline(mime_type, data));
    }
    if !text.is_empty() {
        parts.push(ContentPart::text(text));
    }
    parts
}

pub fn build_history(messages: &[ChatMessage]) -> Vec<Content> {
    messages
        .iter()
        .filter_map(|msg| {
            let parts = content_parts(msg.image.as_deref(), &msg.text);
            if parts.is_empty() {
                return None;
            }
            Some(Content { role: Role::from_caller(&msg.role), parts })
        })
        .collect()
}

fn fenced_block(reply: &str) -> Option<&str> {
    CODE_FENCE.captures(reply)
        .and_then(|c| c.get(1))
        .map(|inner| inner.as_str().trim())
}

/// Decodes the reply as-is first; only when that fails is a fenced block
/// anywhere in the reply tried, so fences inside file contents survive.
pub fn decode_response(reply: &str) -> Result<GenerateResponse, GenerateError> {
    let trimmed = reply.trim();
    let parsed = serde_json::from_str::<GenerateResponse>(trimmed).or_else(|e| {
        match fenced_block(trimmed) {
            Some(inner) => serde_json::from_str::<GenerateResponse>(inner),
            None => Err(e),
        }
    });
    parsed.map_err(|e| {
        let preview: String = reply.chars().take(LOGGED_REPLY_CHARS).collect();
        warn!("Model reply is not a valid generate response: {} (reply starts: {:?})", e, preview);
        GenerateError::UpstreamDecode
    })
}

fn follow_up_prompt(request: &FollowUpRequest) -> String {
    format!(
        "CONTEXT:\n- The user's last request was: \"{}\"\n- The summary of the work I just completed is: \"{}\"\n\nBased on this context, provide one follow-up question.",
        request.last_user_prompt,
        request.last_model_explanation
    )
}

#[derive(Clone)]
pub struct Orchestrator {
    chat_client: Arc<dyn ChatClient>,
    prompt_config: Arc<PromptConfig>,
}

impl Orchestrator {
    pub fn new(chat_client: Arc<dyn ChatClient>, prompt_config: Arc<PromptConfig>) -> Self {
        Self { chat_client, prompt_config }
    }

    /// Relays one generation request. Fails with `InvalidRequest` before any
    /// model call when the history is empty, and also when the new turn would
    /// carry no parts at all (empty text, no existing files, no parsable
    /// image) instead of letting the model service reject an empty turn.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, GenerateError> {
        let (latest, earlier) = match request.chat_history.split_last() {
            Some(split) => split,
            None => {
                return Err(GenerateError::InvalidRequest(EMPTY_HISTORY_DETAIL.to_string()));
            }
        };

        let prompt_text = compose_prompt(&request.existing_files, &latest.text).map_err(|e|
            GenerateError::Upstream(e.to_string())
        )?;
        let message = content_parts(latest.image.as_deref(), &prompt_text);
        if message.is_empty() {
            return Err(GenerateError::InvalidRequest(EMPTY_TURN_DETAIL.to_string()));
        }
        let history = build_history(earlier);

        info!(
            "Generating with {} existing file(s), {} history turn(s), image={}",
            request.existing_files.len(),
            history.len(),
            matches!(message.first(), Some(ContentPart::InlineData { .. }))
        );

        let reply = self.chat_client
            .send_message(ChatRequest {
                system_instruction: self.prompt_config.system_instruction.clone(),
                history,
                message,
                response_mime_type: Some(JSON_MIME_TYPE.to_string()),
                response_schema: Some(code_generation_schema()),
            }).await
            .map_err(|e| {
                error!("Model invocation failed: {}", e);
                GenerateError::Upstream(e.to_string())
            })?;

        let response = decode_response(&reply)?;
        debug!("Model returned {} file(s)", response.files.len());
        Ok(response)
    }

    /// Asks the model for a short next-step suggestion. Failures are logged
    /// and produce an empty question.
    pub async fn follow_up(&self, request: &FollowUpRequest) -> String {
        let result = self.chat_client.send_message(ChatRequest {
            system_instruction: self.prompt_config.follow_up_instruction.clone(),
            history: Vec::new(),
            message: vec![ContentPart::text(follow_up_prompt(request))],
            response_mime_type: None,
            response_schema: None,
        }).await;

        match result {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!("Follow-up question generation failed: {}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: &str, text: &str, image: Option<&str>) -> ChatMessage {
        ChatMessage { role: role.into(), text: text.into(), image: image.map(String::from) }
    }

    #[test]
    fn data_uri_splits_mime_and_payload() {
        assert_eq!(
            parse_data_uri("data:image/png;base64,iVBORw0KGgo="),
            Some(("image/png".to_string(), "iVBORw0KGgo=".to_string()))
        );
    }

    #[test]
    fn non_data_uris_are_ignored() {
        assert_eq!(parse_data_uri("https://example.com/cat.png"), None);
        assert_eq!(parse_data_uri("data:image/png,rawbytes"), None);
        assert_eq!(parse_data_uri("data:;base64,AAAA"), None);
        assert_eq!(parse_data_uri(""), None);
    }

    #[test]
    fn data_uri_mime_is_greedy_and_payload_stops_at_newline() {
        assert_eq!(
            parse_data_uri("data:a;base64,b;base64,c"),
            Some(("a;base64,b".to_string(), "c".to_string()))
        );
        assert_eq!(
            parse_data_uri("data:image/png;base64,AAA\nBBB"),
            Some(("image/png".to_string(), "AAA".to_string()))
        );
    }

    #[test]
    fn data_uri_must_start_the_string() {
        assert_eq!(parse_data_uri(" data:image/png;base64,AAA"), None);
        assert_eq!(parse_data_uri("see data:image/png;base64,AAA"), None);
    }

    #[test]
    fn prompt_is_verbatim_without_files() {
        assert_eq!(compose_prompt(&[], "Build a landing page").unwrap(), "Build a landing page");
    }

    #[test]
    fn prompt_embeds_every_file() {
        let files = vec![
            FileNode { name: "index.html".into(), content: "<html></html>".into() },
            FileNode { name: "style.css".into(), content: "body { margin: 0; }".into() }
        ];
        let prompt = compose_prompt(&files, "Add a footer").unwrap();
        assert!(prompt.starts_with("Here are the current project files:\n\n[\n  {"));
        for f in &files {
            assert!(prompt.contains(&format!("\"name\": \"{}\"", f.name)));
            assert!(prompt.contains(&f.content));
        }
        assert!(prompt.ends_with("please apply this new request: 'Add a footer'"));
    }

    #[test]
    fn image_part_precedes_text() {
        let parts = content_parts(Some("data:image/jpeg;base64,/9j/4A=="), "what is this");
        assert_eq!(parts, vec![
            ContentPart::inline("image/jpeg", "/9j/4A=="),
            ContentPart::text("what is this")
        ]);
    }

    #[test]
    fn history_drops_empty_turns_and_maps_roles() {
        let history = build_history(
            &[
                msg("user", "first", None),
                msg("model", "", None),
                msg("error", "boom", None),
                msg("user", "", Some("data:image/gif;base64,R0lG")),
                msg("user", "", Some("not a uri")),
            ]
        );
        assert_eq!(history, vec![
            Content { role: Role::User, parts: vec![ContentPart::text("first")] },
            Content { role: Role::Model, parts: vec![ContentPart::text("boom")] },
            Content { role: Role::User, parts: vec![ContentPart::inline("image/gif", "R0lG")] }
        ]);
    }

    #[test]
    fn decodes_plain_and_fenced_replies() {
        let body = r#"{"explanation":"ok","files":[{"name":"index.html","content":"<html></html>"}]}"#;
        let expected = GenerateResponse {
            explanation: "ok".into(),
            files: vec![FileNode { name: "index.html".into(), content: "<html></html>".into() }],
        };
        assert_eq!(decode_response(body).unwrap(), expected);
        assert_eq!(decode_response(&format!("```json\n{}\n```", body)).unwrap(), expected);
        assert_eq!(decode_response(&format!("  {}\n", body)).unwrap(), expected);
    }

    #[test]
    fn fenced_block_after_prose_is_decoded() {
        let body = r#"{"explanation":"ok","files":[]}"#;
        let decoded = decode_response(&format!("Here:\n```json\n{}\n```\nEnjoy!", body)).unwrap();
        assert_eq!(decoded.explanation, "ok");
        assert!(decoded.files.is_empty());
    }

    #[test]
    fn fenced_content_inside_files_is_preserved() {
        let body = r#"{"explanation":"ok","files":[{"name":"README.md","content":"```sh\nmake\n```"}]}"#;
        let decoded = decode_response(body).unwrap();
        assert_eq!(decoded.files[0].content, "```sh\nmake\n```");
    }

    #[test]
    fn bad_replies_are_decode_errors() {
        assert!(matches!(decode_response("Sure! Here is your site."), Err(GenerateError::UpstreamDecode)));
        assert!(matches!(decode_response(r#"{"explanation":"ok"}"#), Err(GenerateError::UpstreamDecode)));
        assert_eq!(GenerateError::UpstreamDecode.to_string(), INVALID_JSON_DETAIL);
    }

    #[test]
    fn follow_up_prompt_quotes_context() {
        let prompt = follow_up_prompt(
            &(FollowUpRequest {
                last_user_prompt: "add a nav".into(),
                last_model_explanation: "Added a nav bar".into(),
            })
        );
        assert!(prompt.contains("The user's last request was: \"add a nav\""));
        assert!(prompt.contains("I just completed is: \"Added a nav bar\""));
    }
}
