use ledger_assistant::{
    api::start_server, config::Config, ledger::LedgerStore, llm::OpenAiClient,
    pipeline::Pipeline, telegram::TelegramSender,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    info!("Ledger assistant - webhook server");
    info!("Port: {}", config.port);
    info!("Ledger: {}", config.ledger_path.display());

    // Create components
    let llm = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    ));
    let messenger = Arc::new(TelegramSender::new(&config.telegram_bot_token));
    let ledger = LedgerStore::new(&config.ledger_path);

    let pipeline = Arc::new(Pipeline::new(ledger, llm, messenger));

    info!("Pipeline initialized, starting server");

    start_server(pipeline, config.port).await?;

    Ok(())
}
