//! Aggregation engine
//!
//! Deterministic execution of catalog operations over the normalized table.
//! The LLM is NOT allowed here: every operation is a pure function of its
//! parameters and the snapshot. Recoverable problems (missing parameters,
//! nothing matched) are values in [`AggregationResult`], never errors.

pub mod months;

use crate::catalog::Operation;
use crate::models::{AggregationResult, KindTotals, Movement, MovementKind};
use self::months::resolve_month;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Execute one operation against the table.
///
/// Filtering order: kind, then category (case-insensitive), then calendar
/// month across all years. Grouping is by calendar year or by category.
pub fn execute(
    operation: Operation,
    params: &Map<String, Value>,
    table: &[Movement],
) -> AggregationResult {
    if table.is_empty() {
        return AggregationResult::Failure("No data available".to_string());
    }

    debug!(operation = operation.name(), rows = table.len(), "Executing aggregation");

    match operation {
        Operation::IncomesExpensesByYear => incomes_expenses_by_year(table),
        Operation::ExpensesByMonth => totals_by_month(MovementKind::Expense, params, table),
        Operation::IncomesByMonth => totals_by_month(MovementKind::Income, params, table),
        Operation::ExpensesByCategoryByYear => {
            category_by_year(MovementKind::Expense, params, table)
        }
        Operation::IncomesByCategoryByYear => {
            category_by_year(MovementKind::Income, params, table)
        }
        Operation::ExpensesByCategoryByMonth => expenses_by_category_by_month(params, table),
        Operation::MovementsByCategoryAndMonth => movements_by_category_and_month(params, table),
    }
}

//
// ================= Operations =================
//

fn incomes_expenses_by_year(table: &[Movement]) -> AggregationResult {
    let mut years: BTreeMap<i32, KindTotals> = BTreeMap::new();

    for movement in table {
        let totals = years.entry(movement.year()).or_default();
        match movement.kind {
            MovementKind::Income => totals.income += movement.amount,
            MovementKind::Expense => totals.expense += movement.amount,
        }
    }

    AggregationResult::IncomeExpenseByYear(years)
}

fn totals_by_month(
    kind: MovementKind,
    params: &Map<String, Value>,
    table: &[Movement],
) -> AggregationResult {
    let month = match require_month(params) {
        Ok(month) => month,
        Err(reason) => return AggregationResult::Failure(reason),
    };

    let years = sum_by_year(
        table
            .iter()
            .filter(|m| m.kind == kind)
            .filter(|m| m.month() == month),
    );

    if years.is_empty() {
        AggregationResult::Empty
    } else {
        AggregationResult::ByYear(years)
    }
}

fn category_by_year(
    kind: MovementKind,
    params: &Map<String, Value>,
    table: &[Movement],
) -> AggregationResult {
    let category = match category_param(params) {
        Some(category) => category,
        None => return AggregationResult::Failure("Category not provided".to_string()),
    };

    let years = sum_by_year(
        table
            .iter()
            .filter(|m| m.kind == kind)
            .filter(|m| m.category_matches(&category)),
    );

    if years.is_empty() {
        AggregationResult::Empty
    } else {
        AggregationResult::ByYear(years)
    }
}

/// With a category: per-year expense totals for that category in the month.
/// Without one: the month's expenses broken down per category.
fn expenses_by_category_by_month(
    params: &Map<String, Value>,
    table: &[Movement],
) -> AggregationResult {
    let month = match require_month(params) {
        Ok(month) => month,
        Err(reason) => return AggregationResult::Failure(reason),
    };

    match category_param(params) {
        Some(category) => {
            let years = sum_by_year(
                table
                    .iter()
                    .filter(|m| m.kind == MovementKind::Expense)
                    .filter(|m| m.category_matches(&category))
                    .filter(|m| m.month() == month),
            );

            if years.is_empty() {
                AggregationResult::Empty
            } else {
                AggregationResult::ByYear(years)
            }
        }
        None => {
            let categories = sum_by_category(
                table
                    .iter()
                    .filter(|m| m.kind == MovementKind::Expense)
                    .filter(|m| m.month() == month),
            );

            if categories.is_empty() {
                AggregationResult::Empty
            } else {
                AggregationResult::ByCategory(categories)
            }
        }
    }
}

/// Raw matching records, both kinds, for one category and month.
fn movements_by_category_and_month(
    params: &Map<String, Value>,
    table: &[Movement],
) -> AggregationResult {
    let category = match category_param(params) {
        Some(category) => category,
        None => return AggregationResult::Failure("Category or month not provided".to_string()),
    };
    let raw_month = match string_param(params, "month") {
        Some(raw) => raw,
        None => return AggregationResult::Failure("Category or month not provided".to_string()),
    };
    let month = match resolve_month(&raw_month) {
        Some(month) => month,
        None => {
            return AggregationResult::Failure(format!("Invalid month provided: {}", raw_month))
        }
    };

    let records: Vec<Movement> = table
        .iter()
        .filter(|m| m.category_matches(&category))
        .filter(|m| m.month() == month)
        .cloned()
        .collect();

    if records.is_empty() {
        AggregationResult::Empty
    } else {
        AggregationResult::Records(records)
    }
}

//
// ================= Parameters =================
//

fn string_param(params: &Map<String, Value>, name: &str) -> Option<String> {
    match params.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// The classifier occasionally echoes the schema placeholder back as the
/// value; treat it the same as an absent category.
fn category_param(params: &Map<String, Value>) -> Option<String> {
    string_param(params, "category").filter(|c| c.to_lowercase() != "category")
}

fn require_month(params: &Map<String, Value>) -> Result<u32, String> {
    let raw = match string_param(params, "month") {
        Some(raw) => raw,
        None => return Err("Month not provided".to_string()),
    };

    resolve_month(&raw).ok_or_else(|| format!("Invalid month provided: {}", raw))
}

//
// ================= Grouping =================
//

fn sum_by_year<'a>(movements: impl Iterator<Item = &'a Movement>) -> BTreeMap<i32, Decimal> {
    let mut years: BTreeMap<i32, Decimal> = BTreeMap::new();
    for movement in movements {
        *years.entry(movement.year()).or_default() += movement.amount;
    }
    years
}

/// Groups case-insensitively while keeping the first-seen casing for display.
fn sum_by_category<'a>(
    movements: impl Iterator<Item = &'a Movement>,
) -> BTreeMap<String, Decimal> {
    let mut display: BTreeMap<String, String> = BTreeMap::new();
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();

    for movement in movements {
        let key = movement.category.to_lowercase();
        display
            .entry(key.clone())
            .or_insert_with(|| movement.category.clone());
        *totals.entry(key).or_default() += movement.amount;
    }

    totals
        .into_iter()
        .map(|(key, sum)| {
            let name = display.remove(&key).unwrap_or(key);
            (name, sum)
        })
        .collect()
}
