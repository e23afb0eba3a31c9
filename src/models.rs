//! Core data models for the ledger assistant

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//
// ================= Chat =================
//

/// Opaque chat identifier assigned by the messaging transport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content classification done at the transport edge.
///
/// Voice and unsupported payloads never reach intent resolution; the
/// pipeline answers them with a fixed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Voice,
    Unsupported,
}

/// One inbound chat message, already reduced to what the pipeline consumes.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub content: MessageContent,
}

//
// ================= Ledger =================
//

/// Income-vs-expense classification of a movement.
///
/// The flat-file store uses the literal tokens `income` and `expensive`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Income,
    #[serde(rename = "expensive")]
    Expense,
}

impl MovementKind {
    /// Parse a kind token from the ledger file. Case-insensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "income" => Some(MovementKind::Income),
            "expensive" => Some(MovementKind::Expense),
            _ => None,
        }
    }
}

/// One normalized row of the ledger.
///
/// A `Movement` only exists with a valid amount and date; rows that fail
/// normalization are dropped by the loader and never reach aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movement {
    pub description: String,
    pub kind: MovementKind,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDateTime,
}

impl Movement {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Case-insensitive category equality; display keeps the stored casing.
    pub fn category_matches(&self, other: &str) -> bool {
        self.category.to_lowercase() == other.to_lowercase()
    }
}

//
// ================= Intent =================
//

/// The `{operation, params}` pair inferred from a user message.
///
/// Request-scoped: produced once, consumed once, never persisted. An
/// unresolvable model reply produces [`ResolvedIntent::unresolved`], which
/// downstream code treats as "operation not found" rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedIntent {
    pub operation: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ResolvedIntent {
    pub fn unresolved() -> Self {
        Self {
            operation: String::new(),
            params: serde_json::Map::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.operation.is_empty()
    }
}

//
// ================= Aggregation =================
//

/// Per-year totals split by movement kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KindTotals {
    pub income: Decimal,
    pub expense: Decimal,
}

/// Tagged outcome of executing an operation against the ledger.
///
/// `Empty` (the query ran and matched nothing) is deliberately distinct from
/// `Failure` (the query could not run); the answer composer phrases the two
/// differently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AggregationResult {
    Scalar(Decimal),
    ByYear(BTreeMap<i32, Decimal>),
    IncomeExpenseByYear(BTreeMap<i32, KindTotals>),
    ByCategory(BTreeMap<String, Decimal>),
    Records(Vec<Movement>),
    Empty,
    Failure(String),
}

impl AggregationResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, AggregationResult::Failure(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AggregationResult::Empty)
    }
}

//
// ================= Pipeline =================
//

/// Terminal status of one pipeline run, mapped to an HTTP status at the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// A reply was delivered (including short-circuit and apology replies).
    Completed,
    /// The inbound payload was structurally invalid; nothing was delivered.
    InvalidInput(String),
    /// An internal error occurred; an apology delivery was attempted.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_token_parsing() {
        assert_eq!(MovementKind::from_token("income"), Some(MovementKind::Income));
        assert_eq!(MovementKind::from_token(" Expensive "), Some(MovementKind::Expense));
        assert_eq!(MovementKind::from_token("transfer"), None);
    }

    #[test]
    fn test_category_match_is_case_insensitive() {
        let movement = Movement {
            description: "Supermarket".to_string(),
            kind: MovementKind::Expense,
            amount: Decimal::from(100),
            category: "Food".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        };

        assert!(movement.category_matches("food"));
        assert!(movement.category_matches("FOOD"));
        assert!(!movement.category_matches("transport"));
    }

    #[test]
    fn test_unresolved_intent() {
        let intent = ResolvedIntent::unresolved();
        assert!(!intent.is_resolved());
        assert!(intent.params.is_empty());
    }
}
