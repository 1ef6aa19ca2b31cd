//! Declarative description of one analysis: what to compute and how to draw it.

use crate::charts::{ThresholdBands, ValueFormat};
use crate::stats::{GroupOrder, Statistic};
use plotters::style::RGBColor;

/// Row predicate applied before grouping. Filters in a plan are conjunctive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowFilter {
    /// Value present and strictly positive.
    Positive(&'static str),
    /// Key is one of the listed values.
    KeyIn(&'static str, &'static [&'static str]),
    /// Key differs from the value.
    KeyNot(&'static str, &'static str),
    /// Key is among the `n` most frequent keys of the whole table.
    TopFrequent(&'static str, usize),
}

impl RowFilter {
    pub fn column(&self) -> &'static str {
        match self {
            RowFilter::Positive(c)
            | RowFilter::KeyIn(c, _)
            | RowFilter::KeyNot(c, _)
            | RowFilter::TopFrequent(c, _) => *c,
        }
    }
}

/// One aggregate column of a grouped result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measure {
    /// `None` counts the group's rows.
    pub column: Option<&'static str>,
    pub statistic: Statistic,
    pub label: &'static str,
}

impl Measure {
    pub const fn of(column: &'static str, statistic: Statistic, label: &'static str) -> Self {
        Self {
            column: Some(column),
            statistic,
            label,
        }
    }

    pub const fn rows(label: &'static str) -> Self {
        Self {
            column: None,
            statistic: Statistic::Count,
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPlan {
    /// Group by `key`, aggregate each measure, order the groups.
    Grouped {
        key: &'static str,
        filters: Vec<RowFilter>,
        measures: Vec<Measure>,
        order: GroupOrder,
    },
    /// The `n` rows with the largest `column`, labelled
    /// `"<primary[..primary_chars]> (<secondary[..secondary_chars]>)"`.
    TopN {
        column: &'static str,
        n: usize,
        primary: (&'static str, usize),
        secondary: (&'static str, usize),
    },
    /// Mean of `value` per (`row_key`, `column_key`) cell, columns re-indexed to `columns`.
    CrossTab {
        row_key: &'static str,
        column_key: &'static str,
        columns: &'static [&'static str],
        value: &'static str,
        filters: Vec<RowFilter>,
    },
}

impl AnalysisPlan {
    /// Every table column the plan reads.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::new();
        match self {
            AnalysisPlan::Grouped {
                key,
                filters,
                measures,
                ..
            } => {
                columns.push(*key);
                columns.extend(filters.iter().map(RowFilter::column));
                columns.extend(measures.iter().filter_map(|m| m.column));
            }
            AnalysisPlan::TopN {
                column,
                primary,
                secondary,
                ..
            } => columns.extend([*column, primary.0, secondary.0]),
            AnalysisPlan::CrossTab {
                row_key,
                column_key,
                value,
                filters,
                ..
            } => {
                columns.extend([*row_key, *column_key, *value]);
                columns.extend(filters.iter().map(RowFilter::column));
            }
        }
        let mut unique = Vec::with_capacity(columns.len());
        for column in columns {
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        unique
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    /// Bars of the first measure with whiskers from the second to the third.
    ErrorBar,
    /// One bar per measure, side by side.
    GroupedBar,
    /// First measure on the left axis, second on the right.
    DualAxisBar,
    /// One cluster per row key, one bar per column key.
    ClusteredBar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coloring {
    /// Colour `i` paints series `i`.
    Series(&'static [RGBColor]),
    /// Colour `i` paints bar `i` of a single series.
    PerBar(&'static [RGBColor]),
    Bands(ThresholdBands),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
    /// Right-hand axis description for [`ChartKind::DualAxisBar`].
    pub secondary_desc: &'static str,
    pub size_in: (f64, f64),
    pub bar_width: f64,
    pub coloring: Coloring,
    pub labels: Option<ValueFormat>,
    pub rotate_labels: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisDescriptor {
    pub ordinal: u8,
    pub slug: &'static str,
    pub name: &'static str,
    pub plan: AnalysisPlan,
    pub chart: ChartSpec,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{BEVERAGE, CALORIES, CAFFEINE, CATEGORY, PREP, SIZE, SIZE_ORDER};

    #[test]
    fn grouped_plan_lists_key_filters_and_measures() {
        let plan = AnalysisPlan::Grouped {
            key: CATEGORY,
            filters: vec![RowFilter::Positive(CAFFEINE)],
            measures: vec![Measure::of(CAFFEINE, Statistic::Mean, "Caffeine"), Measure::rows("Rows")],
            order: GroupOrder::Descending(0),
        };
        assert_eq!(plan.required_columns(), vec![CATEGORY, CAFFEINE]);
    }

    #[test]
    fn ranked_and_crosstab_plans_list_their_columns() {
        let top = AnalysisPlan::TopN {
            column: CALORIES,
            n: 15,
            primary: (BEVERAGE, 25),
            secondary: (PREP, 15),
        };
        assert_eq!(top.required_columns(), vec![CALORIES, BEVERAGE, PREP]);

        let cross = AnalysisPlan::CrossTab {
            row_key: CATEGORY,
            column_key: SIZE,
            columns: &SIZE_ORDER,
            value: CALORIES,
            filters: vec![RowFilter::TopFrequent(CATEGORY, 5), RowFilter::KeyIn(SIZE, &SIZE_ORDER)],
        };
        let columns = cross.required_columns();
        assert!(columns.contains(&CATEGORY));
        assert!(columns.contains(&SIZE));
        assert!(columns.contains(&CALORIES));
    }
}
