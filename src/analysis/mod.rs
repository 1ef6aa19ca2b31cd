//! Analysis module - the menu analyses and the engine that runs them

pub mod catalog;
mod descriptor;
mod engine;

pub use catalog::{catalog, select};
pub use descriptor::{
    AnalysisDescriptor, AnalysisPlan, ChartKind, ChartSpec, Coloring, Measure, RowFilter,
};
pub use engine::{AnalysisData, AnalysisEngine, AnalysisError, AnalysisOutcome};
