//! Aggregated results and their ordering.

use serde::Serialize;

/// One output row of a grouped aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    pub values: Vec<f64>,
}

/// Ordered result of a grouped aggregation; `measures[i]` labels `row.values[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub key_column: String,
    pub measures: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

/// How groups are ranked before rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupOrder {
    /// Largest value of the measure first.
    Descending(usize),
    /// Smallest value of the measure first.
    Ascending(usize),
    /// Lexical order of the group key.
    KeyAscending,
    /// The listed keys in the listed order; unlisted keys are dropped.
    Fixed(&'static [&'static str]),
}

impl AggregateResult {
    pub fn keys(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.key.as_str()).collect()
    }

    /// Values of one measure in row order.
    pub fn column(&self, measure: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r.values[measure]).collect()
    }

    /// Sort rows in place. Ties fall back to ascending key order.
    pub fn sort(&mut self, order: GroupOrder) {
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
        match order {
            GroupOrder::Descending(m) => self
                .rows
                .sort_by(|a, b| b.values[m].total_cmp(&a.values[m])),
            GroupOrder::Ascending(m) => self
                .rows
                .sort_by(|a, b| a.values[m].total_cmp(&b.values[m])),
            GroupOrder::KeyAscending => {}
            GroupOrder::Fixed(vocabulary) => {
                self.rows.retain(|r| vocabulary.contains(&r.key.as_str()));
                self.rows.sort_by_key(|r| {
                    vocabulary
                        .iter()
                        .position(|v| *v == r.key)
                        .unwrap_or(usize::MAX)
                });
            }
        }
    }
}

/// One labelled row of a top-N ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub label: String,
    pub value: f64,
}

/// Dense two-key table of means; absent cells are `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `cells[row][column]`.
    pub cells: Vec<Vec<f64>>,
}

impl CrossTab {
    /// Cell values of one column across all rows.
    pub fn column_values(&self, column: usize) -> Vec<f64> {
        self.cells.iter().map(|row| row[column]).collect()
    }
}
