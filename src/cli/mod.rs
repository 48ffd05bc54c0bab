use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:5001")]
    pub server_addr: String,

    /// Maximum accepted request body size in bytes. Inline images travel in the body.
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "26214400")]
    pub max_body_bytes: usize,

    // --- Chat LLM Provider Args ---
    /// API Key for the Gemini model service. Required.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Model name used for generation (e.g., gemini-2.5-flash)
    #[arg(long, env = "CHAT_MODEL", default_value = "gemini-2.5-flash")]
    pub chat_model: String,

    /// Base URL for the Gemini REST API, without the model path.
    #[arg(
        long,
        env = "CHAT_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub chat_base_url: String,

    // --- General App Args ---
    /// Optional JSON file overriding the built-in system and follow-up instructions.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_only_key_given() {
        let args = Args::try_parse_from(["wireframe-relay", "--gemini-api-key", "k"]).unwrap();
        assert_eq!(args.gemini_api_key, "k");
        assert_eq!(args.chat_model, "gemini-2.5-flash");
        assert_eq!(args.server_addr, "0.0.0.0:5001");
        assert!(!args.enable_tls);
        assert!(args.prompts_path.is_none());
    }
}
