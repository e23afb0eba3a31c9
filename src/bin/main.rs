//! Local one-shot runner: sends a question through the full pipeline and
//! prints the reply to stdout instead of delivering it over Telegram.

use async_trait::async_trait;
use ledger_assistant::{
    config::Config,
    ledger::LedgerStore,
    llm::OpenAiClient,
    models::{ChatId, IncomingMessage, MessageContent},
    pipeline::Pipeline,
    telegram::MessagingService,
    Result,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct ConsoleMessenger;

#[async_trait]
impl MessagingService for ConsoleMessenger {
    async fn send(&self, _chat_id: ChatId, text: &str) -> Result<()> {
        println!("\n{}", text);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let config = Config::from_env()?;

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let question = if question.trim().is_empty() {
        "¿Cuál es mi balance de ingresos y gastos por año?".to_string()
    } else {
        question
    };

    let llm = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    ));
    let pipeline = Pipeline::new(
        LedgerStore::new(&config.ledger_path),
        llm,
        Arc::new(ConsoleMessenger),
    );

    println!("> {}", question);

    let outcome = pipeline
        .handle(IncomingMessage {
            chat_id: ChatId(0),
            content: MessageContent::Text(question),
        })
        .await;

    println!("\n[{:?}]", outcome);
    Ok(())
}
