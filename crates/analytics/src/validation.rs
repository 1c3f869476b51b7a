use crate::aggregate::aggregate_by_date_averaged;
use chrono::NaiveDate;
use core_types::{SymbolSelection, ValidationRow};
use serde::{Deserialize, Serialize};

/// One point of the true-vs-predicted validation chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// The validation series of `model` for one symbol, or averaged over all symbols.
pub fn validation_series(
    rows: &[ValidationRow],
    model: &str,
    selection: &SymbolSelection,
) -> Vec<ValidationPoint> {
    match selection {
        SymbolSelection::All => aggregate_by_date_averaged(
            rows,
            |row| (row.model == model).then_some((row.date, ())),
            |row| [row.actual, row.predicted],
        )
        .into_iter()
        .map(|group| ValidationPoint {
            date: group.date,
            actual: group.values[0],
            predicted: group.values[1],
        })
        .collect(),
        SymbolSelection::Symbol(_) => {
            let mut points: Vec<ValidationPoint> = rows
                .iter()
                .filter(|row| row.model == model && selection.matches(&row.symbol))
                .map(|row| ValidationPoint {
                    date: row.date,
                    actual: row.actual,
                    predicted: row.predicted,
                })
                .collect();
            points.sort_by_key(|point| point.date);
            points
        }
    }
}

/// Selector entries: `ALL` first, then each distinct symbol in first-seen order.
pub fn validation_symbols(rows: &[ValidationRow]) -> Vec<String> {
    let mut symbols = vec![SymbolSelection::All.to_string()];
    for row in rows {
        if !symbols.contains(&row.symbol) {
            symbols.push(row.symbol.clone());
        }
    }
    symbols
}

/// Distinct model names in first-seen order.
pub fn validation_models(rows: &[ValidationRow]) -> Vec<String> {
    let mut models: Vec<String> = Vec::new();
    for row in rows {
        if !models.contains(&row.model) {
            models.push(row.model.clone());
        }
    }
    models
}
