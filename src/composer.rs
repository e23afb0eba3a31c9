//! Answer composition
//!
//! Turns an aggregation result plus the original question into the final
//! phrasing prompt. The three shapes (failure, empty, data) get distinct
//! instructions so the model apologizes, reports "nothing found", or answers
//! with the computed numbers. Amounts are formatted for display here and
//! nowhere earlier.

use crate::ledger::format_amount;
use crate::models::{AggregationResult, MovementKind};

/// Build the final-answer prompt for one request.
pub fn compose(user_text: &str, result: &AggregationResult) -> String {
    match result {
        AggregationResult::Failure(reason) => format!(
            r#"Eres un experto en finanzas. El usuario preguntó:
'{user_text}'

La consulta no se pudo ejecutar por este motivo:
'{reason}'

Discúlpate brevemente, explica el problema en lenguaje sencillo y sugiere
reformular la pregunta con otros parámetros (otro mes, otra categoría).
Responde en el idioma del usuario.
"#,
        ),
        AggregationResult::Empty => format!(
            r#"Eres un experto en finanzas. El usuario preguntó:
'{user_text}'

La consulta se ejecutó correctamente pero no se encontraron movimientos que
coincidan con esos filtros.

Dile claramente que no hay datos para lo que pidió y sugiere ajustar los
filtros (otro mes, otra categoría u otro año). Responde en el idioma del
usuario.
"#,
        ),
        data => format!(
            r#"Eres un experto en finanzas. Basado en la siguiente pregunta del usuario:
'{user_text}'

Y los siguientes datos calculados de sus movimientos financieros:
'{data}'

Proporciona una respuesta clara, concisa y amigable para el usuario, en su
idioma. Si hay varios años o categorías, organiza el resultado de forma
clara.
"#,
            data = render_result(data),
        ),
    }
}

/// Human-readable serialization of a data-carrying result.
fn render_result(result: &AggregationResult) -> String {
    match result {
        AggregationResult::Scalar(value) => format_amount(value),
        AggregationResult::ByYear(years) => years
            .iter()
            .map(|(year, total)| format!("- {}: {}", year, format_amount(total)))
            .collect::<Vec<_>>()
            .join("\n"),
        AggregationResult::IncomeExpenseByYear(years) => years
            .iter()
            .map(|(year, totals)| {
                format!(
                    "- {}: ingresos {}, gastos {}",
                    year,
                    format_amount(&totals.income),
                    format_amount(&totals.expense)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        AggregationResult::ByCategory(categories) => categories
            .iter()
            .map(|(category, total)| format!("- {}: {}", category, format_amount(total)))
            .collect::<Vec<_>>()
            .join("\n"),
        AggregationResult::Records(records) => records
            .iter()
            .map(|movement| {
                let kind = match movement.kind {
                    MovementKind::Income => "ingreso",
                    MovementKind::Expense => "gasto",
                };
                format!(
                    "- {}: {} ({}) {} [{}]",
                    movement.date.format("%Y-%m-%d"),
                    movement.description,
                    movement.category,
                    format_amount(&movement.amount),
                    kind,
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        // Empty and Failure never reach here; compose handles them first.
        AggregationResult::Empty | AggregationResult::Failure(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KindTotals, Movement};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    #[test]
    fn test_failure_prompt_carries_reason() {
        let result = AggregationResult::Failure("Invalid month provided: augustus".to_string());
        let prompt = compose("gastos de augustus", &result);

        assert!(prompt.contains("Invalid month provided: augustus"));
        assert!(prompt.contains("Discúlpate"));
    }

    #[test]
    fn test_empty_prompt_is_not_an_apology_for_an_error() {
        let prompt = compose("gastos de viajes", &AggregationResult::Empty);

        assert!(prompt.contains("no se encontraron movimientos"));
        assert!(!prompt.contains("no se pudo ejecutar"));
    }

    #[test]
    fn test_by_year_prompt_formats_amounts() {
        let mut years = BTreeMap::new();
        years.insert(2023, Decimal::from(1_500_000));
        years.insert(2024, Decimal::from(350_000));

        let prompt = compose("¿cuánto gasté?", &AggregationResult::ByYear(years));

        assert!(prompt.contains("- 2023: $1,500,000"));
        assert!(prompt.contains("- 2024: $350,000"));
        assert!(prompt.contains("¿cuánto gasté?"));
    }

    #[test]
    fn test_income_expense_breakdown_lists_both_kinds() {
        let mut years = BTreeMap::new();
        years.insert(
            2024,
            KindTotals {
                income: Decimal::from(3_500_000),
                expense: Decimal::from(1_200_000),
            },
        );

        let prompt = compose("balance", &AggregationResult::IncomeExpenseByYear(years));

        assert!(prompt.contains("ingresos $3,500,000"));
        assert!(prompt.contains("gastos $1,200,000"));
    }

    #[test]
    fn test_records_render_one_line_per_movement() {
        let records = vec![Movement {
            description: "Restaurant".to_string(),
            kind: MovementKind::Expense,
            amount: Decimal::from(45_000),
            category: "food".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 8, 14)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap(),
        }];

        let prompt = compose("movimientos de comida", &AggregationResult::Records(records));

        assert!(prompt.contains("- 2024-08-14: Restaurant (food) $45,000 [gasto]"));
    }
}
