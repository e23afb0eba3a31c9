//! Operation catalog
//!
//! The closed set of deterministic aggregations the assistant can run.
//! The catalog is plain data so it can be embedded verbatim into the
//! classification prompt; dispatch is an exhaustive match on [`Operation`],
//! so adding an operation means touching the registry and the engine match
//! in one visible pair of places.

use serde::Serialize;
use serde_json::json;

/// A named aggregation over the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    IncomesExpensesByYear,
    ExpensesByMonth,
    IncomesByMonth,
    ExpensesByCategoryByYear,
    IncomesByCategoryByYear,
    ExpensesByCategoryByMonth,
    MovementsByCategoryAndMonth,
}

/// Semantic type of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Month,
    Category,
    Year,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

const MONTH: ParamSpec = ParamSpec {
    name: "month",
    kind: ParamKind::Month,
    required: true,
};

const OPTIONAL_CATEGORY: ParamSpec = ParamSpec {
    name: "category",
    kind: ParamKind::Category,
    required: false,
};

const CATEGORY: ParamSpec = ParamSpec {
    name: "category",
    kind: ParamKind::Category,
    required: true,
};

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::IncomesExpensesByYear,
        Operation::ExpensesByMonth,
        Operation::IncomesByMonth,
        Operation::ExpensesByCategoryByYear,
        Operation::IncomesByCategoryByYear,
        Operation::ExpensesByCategoryByMonth,
        Operation::MovementsByCategoryAndMonth,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::IncomesExpensesByYear => "incomes_expenses_by_year",
            Operation::ExpensesByMonth => "expenses_by_month",
            Operation::IncomesByMonth => "incomes_by_month",
            Operation::ExpensesByCategoryByYear => "expenses_by_category_by_year",
            Operation::IncomesByCategoryByYear => "incomes_by_category_by_year",
            Operation::ExpensesByCategoryByMonth => "expenses_by_category_by_month",
            Operation::MovementsByCategoryAndMonth => "movements_by_category_and_month",
        }
    }

    /// Look up an operation by its wire name, as produced by the classifier.
    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name.trim())
    }

    pub fn descriptor(&self) -> OperationDescriptor {
        match self {
            Operation::IncomesExpensesByYear => OperationDescriptor {
                name: self.name(),
                description: "Totales de ingresos y gastos por año",
                params: &[],
            },
            Operation::ExpensesByMonth => OperationDescriptor {
                name: self.name(),
                description: "Gastos de un mes calendario, desglosados por año",
                params: &[MONTH],
            },
            Operation::IncomesByMonth => OperationDescriptor {
                name: self.name(),
                description: "Ingresos de un mes calendario, desglosados por año",
                params: &[MONTH],
            },
            Operation::ExpensesByCategoryByYear => OperationDescriptor {
                name: self.name(),
                description: "Gastos de una categoría, desglosados por año",
                params: &[CATEGORY],
            },
            Operation::IncomesByCategoryByYear => OperationDescriptor {
                name: self.name(),
                description: "Ingresos de una categoría, desglosados por año",
                params: &[CATEGORY],
            },
            Operation::ExpensesByCategoryByMonth => OperationDescriptor {
                name: self.name(),
                description:
                    "Gastos de un mes, opcionalmente de una sola categoría; \
                     sin categoría devuelve todas las categorías del mes",
                params: &[OPTIONAL_CATEGORY, MONTH],
            },
            Operation::MovementsByCategoryAndMonth => OperationDescriptor {
                name: self.name(),
                description: "Movimientos individuales de una categoría y mes",
                params: &[CATEGORY, MONTH],
            },
        }
    }
}

/// The full static catalog.
pub fn catalog() -> Vec<OperationDescriptor> {
    Operation::ALL.iter().map(Operation::descriptor).collect()
}

/// Catalog serialized as a standalone document, keyed by operation name.
/// This exact text is embedded into the classification prompt.
pub fn catalog_json() -> String {
    let mut doc = serde_json::Map::new();
    for descriptor in catalog() {
        doc.insert(
            descriptor.name.to_string(),
            json!({
                "description": descriptor.description,
                "params": descriptor
                    .params
                    .iter()
                    .map(|p| {
                        json!({
                            "name": p.name,
                            "kind": p.kind,
                            "required": p.required,
                        })
                    })
                    .collect::<Vec<_>>(),
            }),
        );
    }

    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
}
