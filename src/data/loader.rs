//! CSV Data Loader Module
//! Reads the menu CSV with Polars and hands it to the processor for normalization.

use crate::data::processor::{DataProcessor, MalformedPolicy, MalformedValueError, ProcessorError};
use crate::data::schema::REQUIRED_TEXT_COLUMNS;
use crate::data::table::MenuTable;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Required column '{0}' is missing from the input")]
    MissingColumn(String),
    #[error("Line {line} has fewer fields than the header")]
    ShortRow { line: usize },
    #[error(transparent)]
    Malformed(#[from] MalformedValueError),
}

impl From<ProcessorError> for LoadError {
    fn from(err: ProcessorError) -> Self {
        match err {
            ProcessorError::PolarsError(e) => LoadError::Csv(e),
            ProcessorError::Malformed(e) => LoadError::Malformed(e),
        }
    }
}

/// Loads and normalizes the menu dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataLoader {
    policy: MalformedPolicy,
}

impl DataLoader {
    pub fn new(policy: MalformedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    /// Load a CSV file and return the normalized, immutable table.
    pub fn load(&self, file_path: &Path) -> Result<MenuTable, LoadError> {
        let raw = Self::load_csv(file_path)?;
        Self::check_required_columns(&raw)?;
        Self::check_complete_rows(&raw)?;

        let table = DataProcessor::normalize(raw, self.policy)?;
        info!(
            path = %file_path.display(),
            rows = table.height(),
            columns = table.width(),
            "loaded menu table"
        );
        Ok(table)
    }

    /// Read the raw CSV with every column kept as text.
    ///
    /// Schema inference is disabled so the processor sees the cells exactly as written
    /// (`"10%"`, `"varies"`, ...). Empty fields stay `""`; only absent fields are null.
    pub fn load_csv(file_path: &Path) -> Result<DataFrame, LoadError> {
        if !file_path.is_file() {
            return Err(LoadError::NotFound(file_path.to_path_buf()));
        }

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_missing_is_null(false)
            .finish()?
            .collect()?;

        debug!(rows = df.height(), columns = df.width(), "read raw csv");
        Ok(df)
    }

    /// A null in the raw frame means the row ended before the header did.
    fn check_complete_rows(df: &DataFrame) -> Result<(), LoadError> {
        let first_short = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .filter_map(|col| {
                let mask = col.is_null();
                let first = mask.into_iter().position(|v| v == Some(true));
                first
            })
            .min();

        match first_short {
            // Header is line 1.
            Some(row) => Err(LoadError::ShortRow { line: row + 2 }),
            None => Ok(()),
        }
    }

    fn check_required_columns(df: &DataFrame) -> Result<(), LoadError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        for required in REQUIRED_TEXT_COLUMNS {
            if !names.iter().any(|n| n == required) {
                return Err(LoadError::MissingColumn(required.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Beverage_category,Beverage,Beverage_prep,Calories, Total Fat (g), Sodium (mg), Protein (g) ,Vitamin A (% DV) ,Calcium (% DV) ,Caffeine (mg)";

    fn write_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        write!(file, "{body}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = DataLoader::default()
            .load(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn loads_and_normalizes_rows() {
        let file = write_csv(
            "Classic Espresso Drinks,Caffè Latte,Short Nonfat Milk,70,0.1,5,6.0,10%,20%,75\n\
             Coffee,Brewed Coffee,Grande,5,0.1,5,1.0,0%,0%,varies\n",
        );

        let table = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(table.height(), 2);
        assert!(table.has_column(TOTAL_FAT));
        assert_eq!(table.numeric(CALORIES).unwrap(), vec![Some(70.0), Some(5.0)]);
        assert_eq!(table.numeric(VITAMIN_A).unwrap(), vec![Some(10.0), Some(0.0)]);
        assert_eq!(table.numeric(CAFFEINE).unwrap(), vec![Some(75.0), None]);
        assert_eq!(
            table.text(SIZE).unwrap(),
            vec![Some("Short"), Some("Grande")]
        );
        assert_eq!(
            table.text(MILK_TYPE).unwrap(),
            vec![Some("Nonfat Milk"), Some("No Milk")]
        );
    }

    #[test]
    fn strict_policy_rejects_bad_percentage() {
        let file = write_csv("Coffee,Brewed Coffee,Tall,3,0.1,5,0.3,abc%,0%,175\n");

        let err = DataLoader::new(MalformedPolicy::Strict)
            .load(file.path())
            .unwrap_err();
        match err {
            LoadError::Malformed(e) => {
                assert_eq!(e.column, VITAMIN_A);
                assert_eq!(e.value, "abc%");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let table = DataLoader::new(MalformedPolicy::Lenient)
            .load(file.path())
            .unwrap();
        assert_eq!(table.numeric(VITAMIN_A).unwrap(), vec![None]);
    }

    #[test]
    fn missing_structural_column_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Beverage_category,Calories").unwrap();
        writeln!(file, "Coffee,5").unwrap();
        file.flush().unwrap();

        let err = DataLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == BEVERAGE));
    }

    #[test]
    fn short_row_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Beverage_category,Beverage,Beverage_prep,Calories,Vitamin A (% DV),Caffeine (mg)").unwrap();
        writeln!(file, "Coffee,Brewed Coffee,Tall,4,0%,260").unwrap();
        writeln!(file, "Coffee,Brewed Coffee").unwrap();
        file.flush().unwrap();

        let err = DataLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::ShortRow { line: 3 }), "{err:?}");
    }

    #[test]
    fn empty_fields_are_not_short_rows() {
        let file = write_csv("Coffee,Brewed Coffee,Tall,,0.1,,0.5,,0%,75\n");

        let table = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(table.numeric(CALORIES).unwrap(), vec![None]);
        assert_eq!(table.numeric(SODIUM).unwrap(), vec![None]);
        assert_eq!(table.numeric(VITAMIN_A).unwrap(), vec![Some(0.0)]);
    }

    #[test]
    fn loading_twice_is_identical() {
        let file = write_csv(
            "Coffee,Brewed Coffee,Venti,5,0.1,10,1.0,,2%,410\n\
             Tazo® Tea Drinks,Tazo® Tea,Tall Soymilk,120,3 2,85,4.0,6%,15%,Varies\n",
        );
        let loader = DataLoader::default();
        let first = loader.load(file.path()).unwrap();
        let second = loader.load(file.path()).unwrap();
        assert!(first.dataframe().equals_missing(second.dataframe()));
    }
}
