use inclusive_chat_api::{
    api::start_server, chat::ChatService, gemini::GeminiClient, store::ConversationStore,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let gemini_api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        eprintln!("GEMINI_API_KEY not set in .env");
        eprintln!("See .env.example for setup instructions");
        String::new()
    });

    let api_port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()?;

    info!("Inclusive Chat API Server");
    info!("Port: {}", api_port);

    // Create components
    let store = Arc::new(ConversationStore::new());
    let model = Arc::new(GeminiClient::new(gemini_api_key));
    let service = Arc::new(ChatService::new(store, model));

    info!("Chat service initialized");
    info!("Starting API server...");

    // Start API server
    start_server(service, api_port).await?;

    Ok(())
}
