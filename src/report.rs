//! Console exploration report for a loaded menu table.

use crate::data::schema::{BEVERAGE, CATEGORY};
use crate::data::{MenuTable, TableError};
use crate::stats::{GroupStats, StatsCalculator};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

const BANNER_WIDTH: usize = 80;
const TOP_BEVERAGES: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frequency {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub records: usize,
    pub columns: Vec<ColumnSummary>,
    pub categories: Vec<Frequency>,
    pub unique_beverages: usize,
    pub top_beverages: Vec<Frequency>,
    pub statistics: Vec<GroupStats>,
    #[serde(skip)]
    pub sample: DataFrame,
}

impl SummaryReport {
    pub fn from_table(table: &MenuTable, sample_rows: usize) -> Result<Self, TableError> {
        let df = table.dataframe();
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnSummary {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                missing: col.null_count(),
            })
            .collect();

        let categories = frequencies(table.value_counts(CATEGORY)?);
        let beverages = table.value_counts(BEVERAGE)?;
        let unique_beverages = beverages.len();
        let top_beverages = frequencies(beverages.into_iter().take(TOP_BEVERAGES).collect());

        // Collected in column order regardless of which worker finishes first.
        let statistics = table
            .numeric_column_names()
            .par_iter()
            .map(|name| -> Result<GroupStats, TableError> {
                let mut stats = StatsCalculator::compute_descriptive_stats(&table.present(name)?);
                stats.group_name = name.clone();
                Ok(stats)
            })
            .collect::<Result<Vec<_>, TableError>>()?;

        Ok(Self {
            records: table.height(),
            columns,
            categories,
            unique_beverages,
            top_beverages,
            statistics,
            sample: df.head(Some(sample_rows)),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn frequencies(counts: Vec<(String, usize)>) -> Vec<Frequency> {
    counts
        .into_iter()
        .map(|(value, count)| Frequency { value, count })
        .collect()
}

fn banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let rule = "=".repeat(BANNER_WIDTH);
    writeln!(f, "\n{rule}")?;
    writeln!(f, "{title}")?;
    writeln!(f, "{rule}")
}

fn fmt_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", value)
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        banner(f, "DATASET OVERVIEW")?;
        writeln!(f, "\nTotal records: {}", self.records)?;
        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        writeln!(f, "\nColumns: {:?}", names)?;

        let width = names.iter().map(|n| n.len()).max().unwrap_or(0);
        writeln!(f, "\nData types:")?;
        for c in &self.columns {
            writeln!(f, "{:<width$}  {}", c.name, c.dtype)?;
        }
        writeln!(f, "\nMissing values:")?;
        for c in &self.columns {
            writeln!(f, "{:<width$}  {}", c.name, c.missing)?;
        }

        banner(f, "BEVERAGE CATEGORIES")?;
        for entry in &self.categories {
            writeln!(f, "{:<40}  {}", entry.value, entry.count)?;
        }

        banner(f, "UNIQUE BEVERAGES")?;
        writeln!(f, "Total unique beverages: {}", self.unique_beverages)?;
        for entry in &self.top_beverages {
            writeln!(f, "{:<50}  {}", entry.value, entry.count)?;
        }

        banner(f, "BASIC STATISTICS")?;
        writeln!(
            f,
            "{:<26} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for s in &self.statistics {
            writeln!(
                f,
                "{:<26} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                s.group_name,
                s.count,
                fmt_stat(s.mean),
                fmt_stat(s.std),
                fmt_stat(s.min),
                fmt_stat(s.p25),
                fmt_stat(s.median),
                fmt_stat(s.p75),
                fmt_stat(s.max)
            )?;
        }

        banner(f, "SAMPLE DATA")?;
        writeln!(f, "{}", self.sample)
    }
}
