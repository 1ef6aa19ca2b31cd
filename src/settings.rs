//! Run configuration gathered from the command line.

use crate::analysis::{self, AnalysisEngine, AnalysisOutcome};
use crate::charts::ChartStyle;
use crate::data::{DataLoader, LoadError, MalformedPolicy};
use std::path::PathBuf;
use tracing::info;

/// Everything one chart-generation run needs. No global state is consulted.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub style: ChartStyle,
    pub policy: MalformedPolicy,
    pub parallel: bool,
    /// Ordinals to run; empty runs all.
    pub only: Vec<u8>,
}

impl RunSettings {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            style: ChartStyle::default(),
            policy: MalformedPolicy::default(),
            parallel: false,
            only: Vec::new(),
        }
    }

    /// Load the table once, then run the selected analyses against it.
    ///
    /// Only loading errors are returned; per-analysis failures are in the outcomes.
    pub fn execute(&self) -> Result<Vec<AnalysisOutcome>, LoadError> {
        let table = DataLoader::new(self.policy).load(&self.input)?;
        let descriptors = analysis::select(&self.only);
        info!(
            analyses = descriptors.len(),
            parallel = self.parallel,
            output = %self.output_dir.display(),
            "generating charts"
        );

        let engine = AnalysisEngine::new(&table, &self.style, &self.output_dir);
        Ok(engine.run_all(&descriptors, self.parallel))
    }
}
