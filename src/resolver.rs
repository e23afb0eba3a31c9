//! Intent resolution
//!
//! Builds the classification prompt from the operation catalog and the user
//! message, then parses the model's reply into a [`ResolvedIntent`]. The
//! model is asked for a single JSON object, but replies routinely arrive
//! wrapped in prose or markdown fences; parsing takes the substring between
//! the first `{` and the last `}`. A reply that yields no parsable object
//! becomes an unresolved intent, never an error.

use crate::catalog::catalog_json;
use crate::llm::LanguageModel;
use crate::models::ResolvedIntent;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

pub struct IntentResolver {
    llm: Arc<dyn LanguageModel>,
}

impl IntentResolver {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Classify one user message against the catalog.
    pub async fn resolve(&self, user_text: &str) -> Result<ResolvedIntent> {
        let prompt = build_classification_prompt(user_text);
        let reply = self.llm.generate(&prompt).await?;

        let intent = extract_intent(&reply);
        debug!(
            operation = %intent.operation,
            resolved = intent.is_resolved(),
            "Intent classified"
        );

        Ok(intent)
    }
}

/// Classification prompt with the catalog embedded verbatim.
pub fn build_classification_prompt(user_text: &str) -> String {
    format!(
        r#"Eres un asistente financiero. Basándote en la siguiente lista de operaciones disponibles:
{catalog}

Y el siguiente mensaje del cliente:
'{message}'

Interpreta cuál de la lista de operaciones pide el cliente. Interpreta correctamente el mes si está en español o inglés. Devuelve únicamente un JSON con la clave 'operation' y, si aplica, la clave 'params' con sus valores. Por ejemplo:
{{"operation": "expenses_by_month", "params": {{"month": "september"}}}}
O si no tiene parámetros:
{{"operation": "incomes_expenses_by_year"}}
"#,
        catalog = catalog_json(),
        message = user_text,
    )
}

/// Parse the model reply into an intent.
///
/// Takes the first `{` to the last `}` as the candidate JSON object; any
/// missing braces or parse failure yields [`ResolvedIntent::unresolved`].
pub fn extract_intent(reply: &str) -> ResolvedIntent {
    let Some(start) = reply.find('{') else {
        return ResolvedIntent::unresolved();
    };
    let Some(end) = reply.rfind('}') else {
        return ResolvedIntent::unresolved();
    };
    if end < start {
        return ResolvedIntent::unresolved();
    }

    let candidate = &reply[start..=end];
    let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) else {
        return ResolvedIntent::unresolved();
    };

    let Some(operation) = value.get("operation").and_then(|v| v.as_str()) else {
        return ResolvedIntent::unresolved();
    };
    if operation.trim().is_empty() {
        return ResolvedIntent::unresolved();
    }

    let params = value
        .get("params")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    ResolvedIntent {
        operation: operation.trim().to_string(),
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssistantError;
    use async_trait::async_trait;

    struct ScriptedModel {
        reply: String,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.reply.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(AssistantError::LlmError("connection refused".to_string()))
        }
    }

    #[test]
    fn test_prompt_embeds_catalog_and_message() {
        let prompt = build_classification_prompt("¿Cuánto gasté en comida en agosto?");
        assert!(prompt.contains("expenses_by_category_by_month"));
        assert!(prompt.contains("incomes_expenses_by_year"));
        assert!(prompt.contains("¿Cuánto gasté en comida en agosto?"));
    }

    #[test]
    fn test_extract_plain_json() {
        let intent =
            extract_intent(r#"{"operation": "expenses_by_month", "params": {"month": "august"}}"#);
        assert_eq!(intent.operation, "expenses_by_month");
        assert_eq!(intent.params["month"], "august");
    }

    #[test]
    fn test_extract_json_wrapped_in_prose() {
        let reply = "Claro, la operación que corresponde es:\n```json\n\
                     {\"operation\": \"incomes_by_month\", \"params\": {\"month\": \"mayo\"}}\n\
                     ```\nEspero que ayude.";
        let intent = extract_intent(reply);
        assert_eq!(intent.operation, "incomes_by_month");
        assert_eq!(intent.params["month"], "mayo");
    }

    #[test]
    fn test_extract_without_params() {
        let intent = extract_intent(r#"{"operation": "incomes_expenses_by_year"}"#);
        assert!(intent.is_resolved());
        assert!(intent.params.is_empty());
    }

    #[test]
    fn test_no_braces_is_unresolved_not_an_error() {
        let intent = extract_intent("No entiendo la pregunta.");
        assert!(!intent.is_resolved());
    }

    #[test]
    fn test_unparsable_braces_are_unresolved() {
        let intent = extract_intent("{operation: broken");
        assert!(!intent.is_resolved());

        let intent = extract_intent("}{");
        assert!(!intent.is_resolved());
    }

    #[test]
    fn test_missing_operation_key_is_unresolved() {
        let intent = extract_intent(r#"{"params": {"month": "august"}}"#);
        assert!(!intent.is_resolved());
    }

    #[tokio::test]
    async fn test_resolve_with_scripted_model() {
        let model = Arc::new(ScriptedModel {
            reply: "La respuesta es {\"operation\": \"expenses_by_month\", \
                    \"params\": {\"month\": \"8\"}} según el catálogo."
                .to_string(),
        });
        let resolver = IntentResolver::new(model);

        let intent = resolver.resolve("gastos de agosto").await.unwrap();
        assert_eq!(intent.operation, "expenses_by_month");
    }

    #[tokio::test]
    async fn test_resolve_propagates_llm_failure() {
        let resolver = IntentResolver::new(Arc::new(FailingModel));
        let result = resolver.resolve("gastos de agosto").await;
        assert!(result.is_err());
    }
}
