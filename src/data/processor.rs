//! Data Processor Module
//! Handles data cleaning: header trimming, numeric coercion and the derived
//! `Size` / `Milk_Type` columns.

use crate::data::schema::{
    CAFFEINE, MILK_FALLBACK, MILK_TYPE, MILK_TYPES, PERCENT_COLUMNS, PLAIN_NUMERIC_COLUMNS,
    PREP, REQUIRED_TEXT_COLUMNS, SIZE, SIZE_FALLBACK, SIZE_ORDER,
};
use crate::data::table::MenuTable;
use polars::prelude::*;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Malformed(#[from] MalformedValueError),
}

/// A percentage cell that is neither empty nor numeric once the `%` is removed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Malformed value '{value}' in column '{column}' at row {row}")]
pub struct MalformedValueError {
    pub column: String,
    pub row: usize,
    pub value: String,
}

/// What to do with a malformed percentage cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MalformedPolicy {
    /// Abort loading with a [`MalformedValueError`].
    #[default]
    Strict,
    /// Replace the cell with the missing marker.
    Lenient,
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Normalize a raw, all-text frame into a [`MenuTable`].
    pub fn normalize(raw: DataFrame, policy: MalformedPolicy) -> Result<MenuTable, ProcessorError> {
        let mut df = raw;

        let trimmed: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.trim().to_string())
            .collect();
        df.set_column_names(trimmed)?;

        // Blank keys are missing keys.
        for column in REQUIRED_TEXT_COLUMNS {
            if let Some(cells) = Self::text_cells(&df, column)? {
                let keys: Vec<Option<String>> = cells
                    .into_iter()
                    .map(|c| c.filter(|k| !k.trim().is_empty()))
                    .collect();
                df.with_column(Column::new(column.into(), keys))?;
            }
        }

        for column in PERCENT_COLUMNS {
            if let Some(cells) = Self::text_cells(&df, column)? {
                let values = Self::parse_percent_column(column, &cells, policy)?;
                df.with_column(Column::new(column.into(), values))?;
            }
        }

        for column in PLAIN_NUMERIC_COLUMNS {
            if let Some(cells) = Self::text_cells(&df, column)? {
                let values = Self::parse_numeric_column(column, &cells);
                df.with_column(Column::new(column.into(), values))?;
            }
        }

        let preps = Self::text_cells(&df, PREP)?.unwrap_or_default();
        let sizes: Vec<&str> = preps
            .iter()
            .map(|p| Self::derive_size(p.as_deref().unwrap_or_default()))
            .collect();
        let milks: Vec<&str> = preps
            .iter()
            .map(|p| Self::derive_milk_type(p.as_deref().unwrap_or_default()))
            .collect();
        df.with_column(Column::new(SIZE.into(), sizes))?;
        df.with_column(Column::new(MILK_TYPE.into(), milks))?;

        Ok(MenuTable::new(df))
    }

    /// Owned text cells of a column, or `None` when the column is absent.
    fn text_cells(df: &DataFrame, column: &str) -> Result<Option<Vec<Option<String>>>, ProcessorError> {
        if df.get_column_index(column).is_none() {
            return Ok(None);
        }
        let as_text = df.column(column)?.cast(&DataType::String)?;
        let cells = as_text
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(Some(cells))
    }

    fn parse_percent_column(
        column: &str,
        cells: &[Option<String>],
        policy: MalformedPolicy,
    ) -> Result<Vec<Option<f64>>, ProcessorError> {
        let mut coerced = 0usize;
        let mut values = Vec::with_capacity(cells.len());

        for (row, cell) in cells.iter().enumerate() {
            let raw = cell.as_deref().unwrap_or_default();
            match Self::parse_percent(raw) {
                Some(v) => values.push(Some(v)),
                None => match policy {
                    MalformedPolicy::Strict => {
                        return Err(MalformedValueError {
                            column: column.to_string(),
                            row,
                            value: raw.to_string(),
                        }
                        .into())
                    }
                    MalformedPolicy::Lenient => {
                        coerced += 1;
                        values.push(None);
                    }
                },
            }
        }

        if coerced > 0 {
            warn!(column, coerced, "malformed percentages replaced with missing");
        }
        Ok(values)
    }

    fn parse_numeric_column(column: &str, cells: &[Option<String>]) -> Vec<Option<f64>> {
        let mut coerced = 0usize;
        let values = cells
            .iter()
            .map(|cell| {
                let text = cell.as_deref()?;
                let parsed = Self::parse_number(text);
                if parsed.is_none() && !text.trim().is_empty() {
                    coerced += 1;
                }
                parsed
            })
            .collect();

        // Caffeine placeholders ("varies") are expected; anything else is worth a warning.
        if coerced > 0 && column != CAFFEINE {
            warn!(column, coerced, "non-numeric values replaced with missing");
        }
        values
    }

    /// Parse a percentage cell: one trailing `%` is removed and an empty residue means `0`.
    ///
    /// Returns `None` when a non-numeric or non-finite residue remains.
    pub fn parse_percent(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        let residue = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        if residue.is_empty() {
            return Some(0.0);
        }
        residue.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Parse a plain numeric cell; empty or non-numeric text yields `None`.
    pub fn parse_number(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// First size token contained in the descriptor, else [`SIZE_FALLBACK`].
    pub fn derive_size(prep: &str) -> &'static str {
        Self::first_match(prep, &SIZE_ORDER).unwrap_or(SIZE_FALLBACK)
    }

    /// First milk token contained in the descriptor, else [`MILK_FALLBACK`].
    pub fn derive_milk_type(prep: &str) -> &'static str {
        Self::first_match(prep, &MILK_TYPES).unwrap_or(MILK_FALLBACK)
    }

    fn first_match(text: &str, vocabulary: &[&'static str]) -> Option<&'static str> {
        vocabulary.iter().copied().find(|token| text.contains(token))
    }
}
