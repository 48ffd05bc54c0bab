use serde::Deserialize;
use serde_json::{ json, Value as JsonValue };
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;
use thiserror::Error;

const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"
You are an expert web developer AI. Your task is to generate and modify code for a web project based on user requests. You will be given the user's prompt and the current project files, if any.

- If there are no existing files, your task is to act as a wireframe generator. You must output HTML and CSS code for a simple black-and-white wireframe layout of the website described by the user.
  - Use only boxes, div outlines, nav bars, and placeholders for text and images.
  - Do not use colors or actual content. Use labels like [Logo], [Nav], [Hero Image], [Text Box], etc.
  - Generate minimal and clean HTML + CSS.

- If there are existing files, modify them according to the user's request. You can add new files, update the content of existing ones, or remove files by omitting them from your response.

- If the user provides a JSON object of design tokens, you MUST update the CSS to use the values defined in the tokens (e.g., for colors, fonts, spacing). Prefer creating CSS variables in a `:root` selector.

CRITICAL: You MUST return the COMPLETE and UPDATED list of ALL project files in your response. This includes files that were not changed. The entire project state should be represented in your output.

The output format MUST be a single JSON object with two keys:
1. "explanation": A friendly, conversational summary of the changes you made. Briefly explain what you understood from the user's request and how you addressed it in the code.
2. "files": An array of file objects, where each object has 'name' and 'content' properties.

Ensure the HTML file correctly links to any CSS and JS files using relative paths.
"#;

const DEFAULT_FOLLOW_UP_INSTRUCTION: &str = r#"You are an expert web developer AI acting as a helpful assistant. Your goal is to help the user build out their wireframe step-by-step.
You will be given the user's most recent request and the explanation of the code you just generated to fulfill that request.
Based on this context, your task is to ask two single, concise, and relevant follow-up question.
This question should suggest a logical next step or a common feature related to the user's request.
For example, if the user just added a navigation bar, you could ask, "Great! Now, would you like me to add some navigation links like 'Home', 'About', and 'Contact' to the header?".
If the user just created a basic layout, you might ask, "Would you like to add a hero section with a call-to-action button to grab visitors' attention?".

IMPORTANT RULES:
- Only ask TWO question.
- Keep the question short and to the point.
- Dont ask static questions like " do you want to change text or nav links ", focus on layout and structure.
- Do NOT generate any code.
- Do NOT explain what you did before. The user has already seen the explanation.
- Frame the question as a helpful suggestion.
- Your entire response should be just the question itself, nothing else."#;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt '{0}' must not be empty")]
    EmptyPrompt(&'static str),
    #[error("Prompt file IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Prompt JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Instructions handed to the model service. Loaded once at startup and
/// shared read-only.
#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
    #[serde(default = "default_follow_up_instruction")]
    pub follow_up_instruction: String,
}

fn default_system_instruction() -> String {
    DEFAULT_SYSTEM_INSTRUCTION.to_string()
}

fn default_follow_up_instruction() -> String {
    DEFAULT_FOLLOW_UP_INSTRUCTION.to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_instruction: default_system_instruction(),
            follow_up_instruction: default_follow_up_instruction(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if self.system_instruction.trim().is_empty() {
            return Err(PromptError::EmptyPrompt("system_instruction"));
        }
        if self.follow_up_instruction.trim().is_empty() {
            return Err(PromptError::EmptyPrompt("follow_up_instruction"));
        }
        Ok(())
    }
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = fs::read_to_string(path.as_ref())?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded prompts from '{}'", path.as_ref().display());
    Ok(Arc::new(config))
}

/// Resolves the prompt configuration: the file at `path` when given, the
/// built-in instructions otherwise.
pub fn resolve_prompts(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path {
        Some(p) if !p.trim().is_empty() => load_prompts(p),
        _ => {
            info!("Using built-in prompts");
            Ok(Arc::new(PromptConfig::default()))
        }
    }
}

/// Response schema for code generation replies, in the model service's
/// OpenAPI subset.
pub fn code_generation_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "explanation": {
                "type": "STRING",
                "description": "A friendly, conversational summary of the changes made. Explain what you understood from the user's request and how you addressed it in the code."
            },
            "files": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {
                            "type": "STRING",
                            "description": "The full filename, e.g., 'index.html' or 'style.css'"
                        },
                        "content": {
                            "type": "STRING",
                            "description": "The complete code content for the file."
                        }
                    },
                    "required": ["name", "content"]
                }
            }
        },
        "required": ["explanation", "files"]
    })
}
