//! The normalized, read-only menu table.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Column '{0}' not found")]
    MissingColumn(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Normalized menu data. Built once by the loader and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct MenuTable {
    df: DataFrame,
}

impl MenuTable {
    pub(crate) fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }

    /// Text cells of a column. Non-text columns are an error.
    pub fn text(&self, name: &str) -> Result<Vec<Option<&str>>, TableError> {
        let column = self.column(name)?;
        Ok(column.str()?.into_iter().collect())
    }

    /// Numeric cells of a column; `None` is the missing marker.
    pub fn numeric(&self, name: &str) -> Result<Vec<Option<f64>>, TableError> {
        let column = self.column(name)?;
        let values = column.cast(&DataType::Float64)?;
        let ca = values.f64()?;
        Ok(ca.into_iter().collect())
    }

    /// Present values of a numeric column, in row order.
    pub fn present(&self, name: &str) -> Result<Vec<f64>, TableError> {
        Ok(self.numeric(name)?.into_iter().flatten().collect())
    }

    /// Names of all Float64 columns, in table order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| col.dtype() == &DataType::Float64)
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Rows for which `predicate` is true. Null results drop the row.
    pub fn filter(&self, predicate: Expr) -> Result<MenuTable, TableError> {
        let df = self.df.clone().lazy().filter(predicate).collect()?;
        Ok(MenuTable::new(df))
    }

    /// Rows whose `key` column equals `value`.
    pub fn rows_where(&self, key: &str, value: &str) -> Result<MenuTable, TableError> {
        self.column(key)?;
        self.filter(col(key).eq(lit(value)))
    }

    /// Distinct non-missing values of a text column, in lexical order.
    pub fn distinct(&self, name: &str) -> Result<Vec<String>, TableError> {
        let unique = self.column(name)?.drop_nulls().unique()?;
        let mut values: Vec<String> = unique
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        values.sort();
        Ok(values)
    }

    /// Occurrences of each non-missing value, most frequent first; ties by ascending value.
    pub fn value_counts(&self, name: &str) -> Result<Vec<(String, usize)>, TableError> {
        self.column(name)?;
        let counts = self
            .df
            .clone()
            .lazy()
            .filter(col(name).is_not_null())
            .group_by([col(name)])
            .agg([len().alias("count")])
            .collect()?;

        let values = counts.column(name)?.str()?;
        let totals = counts.column("count")?.cast(&DataType::UInt64)?;
        let mut ranked: Vec<(String, usize)> = values
            .into_iter()
            .zip(totals.u64()?.into_iter())
            .filter_map(|(value, count)| Some((value?.to_string(), count? as usize)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked)
    }

    /// The `n` rows with the largest present value of `name`, largest first.
    ///
    /// Equal values keep table order.
    pub fn top_rows(&self, name: &str, n: usize) -> Result<MenuTable, TableError> {
        self.column(name)?;
        let df = self
            .df
            .clone()
            .lazy()
            .filter(col(name).is_not_null())
            .sort_by_exprs(
                [col(name)],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .limit(n as IdxSize)
            .collect()?;
        Ok(MenuTable::new(df))
    }

    fn column(&self, name: &str) -> Result<&Column, TableError> {
        if !self.has_column(name) {
            return Err(TableError::MissingColumn(name.to_string()));
        }
        Ok(self.df.column(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MenuTable {
        MenuTable::new(
            df!(
                "key" => [Some("x"), Some("y"), Some("y"), Some("z"), Some("x"), None],
                "value" => [Some(5.0), None, Some(9.0), Some(5.0), Some(2.0), Some(7.0)]
            )
            .unwrap(),
        )
    }

    #[test]
    fn distinct_skips_missing_and_sorts() {
        assert_eq!(table().distinct("key").unwrap(), vec!["x", "y", "z"]);
    }

    #[test]
    fn value_counts_rank_by_count_then_value() {
        assert_eq!(
            table().value_counts("key").unwrap(),
            vec![("x".into(), 2), ("y".into(), 2), ("z".into(), 1)]
        );
    }

    #[test]
    fn rows_where_selects_one_group() {
        let group = table().rows_where("key", "y").unwrap();
        assert_eq!(group.height(), 2);
        assert_eq!(group.present("value").unwrap(), vec![9.0]);
    }

    #[test]
    fn top_rows_are_descending_and_stable() {
        let top = table().top_rows("value", 10).unwrap();
        assert_eq!(top.present("value").unwrap(), vec![9.0, 7.0, 5.0, 5.0, 2.0]);
        let keys = top.text("key").unwrap();
        assert_eq!(keys[2..4], [Some("x"), Some("z")]);
    }

    #[test]
    fn top_rows_of_calories() {
        let t = MenuTable::new(df!("Calories" => [80.0, 450.0, 120.0, 600.0, 300.0, 90.0]).unwrap());
        let top = t.top_rows("Calories", 5).unwrap();
        assert_eq!(top.present("Calories").unwrap(), vec![600.0, 450.0, 300.0, 120.0, 90.0]);
    }

    #[test]
    fn unknown_column_is_reported() {
        assert!(matches!(
            table().distinct("nope"),
            Err(TableError::MissingColumn(c)) if c == "nope"
        ));
    }
}
