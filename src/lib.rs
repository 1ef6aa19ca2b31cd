//! Menu Insights - beverage menu nutrition analysis & business chart generation
//!
//! Loads the menu CSV into a normalized [`data::MenuTable`], prints an exploration
//! report, and renders a fixed set of analysis charts.

pub mod analysis;
pub mod charts;
pub mod data;
pub mod report;
pub mod settings;
pub mod stats;
