pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod orchestrator;

use cli::Args;
use config::prompt::resolve_prompts;
use llm::LlmConfig;
use llm::chat::new_client as new_chat_client;
use log::info;
use orchestrator::Orchestrator;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {}", args.chat_base_url);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Max Body Bytes: {}", args.max_body_bytes);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let prompt_config = resolve_prompts(args.prompts_path.as_deref())?;

    let chat_config = LlmConfig {
        api_key: Some(args.gemini_api_key.clone()),
        completion_model: Some(args.chat_model.clone()),
        base_url: Some(args.chat_base_url.clone()),
    };
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Model={}, BaseURL={}",
        chat_client.get_model(),
        chat_client.get_base_url().as_deref().unwrap_or("adapter default")
    );

    let orchestrator = Arc::new(Orchestrator::new(chat_client, prompt_config));
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, orchestrator, args);
    server.run().await?;

    Ok(())
}
