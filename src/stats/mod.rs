//! Stats module - descriptive statistics and grouped aggregation

pub mod aggregate;
mod calculator;

pub use aggregate::{AggregateResult, AggregateRow, CrossTab, GroupOrder, RankedItem};
pub use calculator::{GroupStats, Statistic, StatsCalculator};
