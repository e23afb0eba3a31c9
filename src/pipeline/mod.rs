//! Pipeline orchestrator
//!
//! Sequences one request end to end:
//!
//! RECEIVE → CLASSIFY TYPE → RESOLVE INTENT → AGGREGATE → COMPOSE → DELIVER
//!
//! Voice and unsupported content jump straight to delivery with a fixed
//! reply. Resolution and aggregation problems travel as `Failure` results
//! into the composer so the user gets a conversational explanation; only
//! infrastructure errors (LLM or delivery) take the apology path. Everything
//! is request-scoped: the ledger snapshot, the intent and the result are
//! dropped when the reply is out.

use crate::catalog::Operation;
use crate::composer;
use crate::engine;
use crate::ledger::LedgerStore;
use crate::llm::LanguageModel;
use crate::models::{AggregationResult, ChatId, IncomingMessage, MessageContent, PipelineOutcome};
use crate::resolver::IntentResolver;
use crate::telegram::MessagingService;
use crate::Result;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Fixed reply for voice notes; they never reach the aggregation engine.
pub const VOICE_REPLY: &str =
    "Lo siento, aún no puedo escuchar notas de voz. Escríbeme tu pregunta en texto.";

/// Fixed reply for photos, stickers and other non-text content.
pub const UNSUPPORTED_REPLY: &str =
    "Por ahora solo entiendo mensajes de texto. Escríbeme tu pregunta sobre tus movimientos.";

/// Best-effort apology when something breaks mid-request.
pub const APOLOGY_REPLY: &str =
    "Lo siento, hubo un error al procesar tu solicitud. Inténtalo de nuevo más tarde.";

pub struct Pipeline {
    ledger: LedgerStore,
    resolver: IntentResolver,
    llm: Arc<dyn LanguageModel>,
    messenger: Arc<dyn MessagingService>,
}

impl Pipeline {
    pub fn new(
        ledger: LedgerStore,
        llm: Arc<dyn LanguageModel>,
        messenger: Arc<dyn MessagingService>,
    ) -> Self {
        Self {
            ledger,
            resolver: IntentResolver::new(llm.clone()),
            llm,
            messenger,
        }
    }

    /// Run the pipeline for one inbound message.
    pub async fn handle(&self, message: IncomingMessage) -> PipelineOutcome {
        let request_id = Uuid::new_v4();
        let chat_ref = chat_correlation_id(message.chat_id);

        info!(
            request = %request_id,
            chat = %chat_ref,
            "Pipeline: message received"
        );

        match &message.content {
            MessageContent::Voice => {
                info!(request = %request_id, "Voice note, short-circuiting to delivery");
                self.deliver(message.chat_id, VOICE_REPLY).await
            }
            MessageContent::Unsupported => {
                info!(request = %request_id, "Unsupported content, short-circuiting to delivery");
                self.deliver(message.chat_id, UNSUPPORTED_REPLY).await
            }
            MessageContent::Text(text) => match self.answer(text).await {
                Ok(reply) => self.deliver(message.chat_id, &reply).await,
                Err(e) => {
                    error!(request = %request_id, chat = %chat_ref, error = %e, "Pipeline errored");

                    // Best-effort apology; the original failure is what we report.
                    if let Err(send_err) = self.messenger.send(message.chat_id, APOLOGY_REPLY).await
                    {
                        warn!(chat = %chat_ref, error = %send_err, "Apology delivery failed");
                    }

                    PipelineOutcome::Failed(e.to_string())
                }
            },
        }
    }

    /// Resolve, aggregate and compose the reply text for a question.
    async fn answer(&self, text: &str) -> Result<String> {
        let table = self.ledger.load();

        let intent = self.resolver.resolve(text).await?;

        let result = if !intent.is_resolved() {
            AggregationResult::Failure(
                "The request could not be mapped to a known operation".to_string(),
            )
        } else {
            match Operation::from_name(&intent.operation) {
                Some(operation) => engine::execute(operation, &intent.params, &table),
                None => {
                    AggregationResult::Failure(format!("Unknown operation: {}", intent.operation))
                }
            }
        };

        if let AggregationResult::Failure(reason) = &result {
            warn!(reason = %reason, "Aggregation reported a failure");
        }

        let prompt = composer::compose(text, &result);
        self.llm.generate(&prompt).await
    }

    async fn deliver(&self, chat_id: ChatId, reply: &str) -> PipelineOutcome {
        match self.messenger.send(chat_id, reply).await {
            Ok(()) => PipelineOutcome::Completed,
            Err(e) => {
                warn!(chat = %chat_id, error = %e, "Reply delivery failed");
                PipelineOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Stable UUID derived from the chat identifier, for log correlation
/// without logging the raw chat id.
fn chat_correlation_id(chat_id: ChatId) -> Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(chat_id.to_string().as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}
