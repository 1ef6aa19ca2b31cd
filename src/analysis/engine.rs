//! Analysis Engine
//! Runs analysis descriptors against the menu table: filter, group, aggregate,
//! order, then hand a [`Figure`] to the renderer.

use crate::analysis::descriptor::{
    AnalysisDescriptor, AnalysisPlan, ChartKind, Coloring, Measure, RowFilter,
};
use crate::charts::{BarSeries, ChartRenderer, ChartStyle, Figure, Orientation, RenderError};
use crate::data::{MenuTable, TableError};
use crate::stats::{AggregateResult, AggregateRow, CrossTab, GroupOrder, RankedItem, StatsCalculator};
use plotters::style::RGBColor;
use polars::prelude::{col, lit, Expr};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, info_span};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{analysis}: required column '{column}' is missing")]
    MissingColumn { analysis: String, column: String },
    #[error("{analysis}: no rows left after filtering")]
    Empty { analysis: String },
    #[error("{analysis}: {source}")]
    Table {
        analysis: String,
        #[source]
        source: TableError,
    },
    #[error("{analysis}: {source}")]
    Render {
        analysis: String,
        #[source]
        source: RenderError,
    },
}

impl AnalysisError {
    fn from_table(analysis: &str, err: TableError) -> Self {
        match err {
            TableError::MissingColumn(column) => AnalysisError::MissingColumn {
                analysis: analysis.to_string(),
                column,
            },
            source => AnalysisError::Table {
                analysis: analysis.to_string(),
                source,
            },
        }
    }
}

/// Aggregated data for one analysis, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisData {
    Grouped(AggregateResult),
    Ranked(Vec<RankedItem>),
    CrossTab(CrossTab),
}

impl AnalysisData {
    pub fn is_empty(&self) -> bool {
        match self {
            AnalysisData::Grouped(result) => result.rows.is_empty(),
            AnalysisData::Ranked(items) => items.is_empty(),
            AnalysisData::CrossTab(tab) => tab.rows.is_empty(),
        }
    }
}

/// Result of one analysis in a batch.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub ordinal: u8,
    pub slug: &'static str,
    pub name: &'static str,
    pub result: Result<PathBuf, AnalysisError>,
}

impl AnalysisOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct AnalysisEngine<'a> {
    table: &'a MenuTable,
    style: &'a ChartStyle,
    output_dir: &'a Path,
}

impl<'a> AnalysisEngine<'a> {
    pub fn new(table: &'a MenuTable, style: &'a ChartStyle, output_dir: &'a Path) -> Self {
        Self {
            table,
            style,
            output_dir,
        }
    }

    /// `<output_dir>/NN_slug.<ext>`
    pub fn output_path(&self, descriptor: &AnalysisDescriptor) -> PathBuf {
        self.output_dir
            .join(self.style.file_name(descriptor.ordinal, descriptor.slug))
    }

    /// Run every descriptor. A failure is logged and recorded; it never stops the batch.
    ///
    /// Outcomes are returned in descriptor order in both modes.
    pub fn run_all(&self, descriptors: &[AnalysisDescriptor], parallel: bool) -> Vec<AnalysisOutcome> {
        let run_one = |descriptor: &AnalysisDescriptor| {
            let result = self.run(descriptor);
            if let Err(e) = &result {
                error!(
                    ordinal = descriptor.ordinal,
                    analysis = descriptor.name,
                    error = %e,
                    "analysis failed"
                );
            }
            AnalysisOutcome {
                ordinal: descriptor.ordinal,
                slug: descriptor.slug,
                name: descriptor.name,
                result,
            }
        };

        if parallel {
            descriptors.par_iter().map(run_one).collect()
        } else {
            descriptors.iter().map(run_one).collect()
        }
    }

    /// Compute, draw and write one chart.
    pub fn run(&self, descriptor: &AnalysisDescriptor) -> Result<PathBuf, AnalysisError> {
        let span = info_span!("analysis", ordinal = descriptor.ordinal, name = descriptor.name);
        let _guard = span.enter();

        let data = self.compute(descriptor)?;
        let figure = Self::build_figure(descriptor, &data);
        let path = self.output_path(descriptor);

        ChartRenderer::render(&figure, self.style, &path).map_err(|source| {
            AnalysisError::Render {
                analysis: descriptor.name.to_string(),
                source,
            }
        })?;

        info!(path = %path.display(), "chart written");
        Ok(path)
    }

    /// Filter, group, aggregate and order. Touches no files.
    pub fn compute(&self, descriptor: &AnalysisDescriptor) -> Result<AnalysisData, AnalysisError> {
        let analysis = descriptor.name;
        if let Some(column) = descriptor
            .plan
            .required_columns()
            .into_iter()
            .find(|c| !self.table.has_column(c))
        {
            return Err(AnalysisError::MissingColumn {
                analysis: analysis.to_string(),
                column: column.to_string(),
            });
        }

        let data = match &descriptor.plan {
            AnalysisPlan::Grouped {
                key,
                filters,
                measures,
                order,
            } => self
                .grouped(key, filters, measures, *order)
                .map(AnalysisData::Grouped),
            AnalysisPlan::TopN {
                column,
                n,
                primary,
                secondary,
            } => self
                .ranked(column, *n, *primary, *secondary)
                .map(AnalysisData::Ranked),
            AnalysisPlan::CrossTab {
                row_key,
                column_key,
                columns,
                value,
                filters,
            } => self
                .cross_tab(row_key, column_key, columns, value, filters)
                .map(AnalysisData::CrossTab),
        }
        .map_err(|e| AnalysisError::from_table(analysis, e))?;

        if data.is_empty() {
            return Err(AnalysisError::Empty {
                analysis: analysis.to_string(),
            });
        }
        Ok(data)
    }

    /// Rows passing every filter, selected with polars expressions.
    fn selection(&self, filters: &[RowFilter]) -> Result<MenuTable, TableError> {
        let mut predicate: Option<Expr> = None;
        for filter in filters {
            let expr = match *filter {
                RowFilter::Positive(column) => col(column).gt(lit(0.0)),
                RowFilter::KeyIn(column, allowed) => any_of(column, allowed.iter().copied()),
                RowFilter::KeyNot(column, excluded) => col(column).neq(lit(excluded)),
                RowFilter::TopFrequent(column, n) => {
                    let top: Vec<String> = self
                        .table
                        .value_counts(column)?
                        .into_iter()
                        .take(n)
                        .map(|(key, _)| key)
                        .collect();
                    any_of(column, top.iter().map(String::as_str))
                }
            };
            predicate = Some(match predicate {
                Some(p) => p.and(expr),
                None => expr,
            });
        }

        match predicate {
            Some(p) => self.table.filter(p),
            None => Ok(self.table.clone()),
        }
    }

    fn grouped(
        &self,
        key: &str,
        filters: &[RowFilter],
        measures: &[Measure],
        order: GroupOrder,
    ) -> Result<AggregateResult, TableError> {
        let selected = self.selection(filters)?;

        let mut result = AggregateResult {
            key_column: key.to_string(),
            measures: measures.iter().map(|m| m.label.to_string()).collect(),
            rows: Vec::new(),
        };

        'groups: for group in selected.distinct(key)? {
            let members = selected.rows_where(key, &group)?;
            let mut values = Vec::with_capacity(measures.len());
            for measure in measures {
                let value = match measure.column {
                    Some(column) => measure.statistic.evaluate(&members.present(column)?),
                    None => Some(members.height() as f64),
                };
                // A group with nothing to aggregate is left out, never drawn as zero.
                match value {
                    Some(v) => values.push(v),
                    None => continue 'groups,
                }
            }
            result.rows.push(AggregateRow { key: group, values });
        }

        result.sort(order);
        Ok(result)
    }

    fn ranked(
        &self,
        column: &str,
        n: usize,
        primary: (&str, usize),
        secondary: (&str, usize),
    ) -> Result<Vec<RankedItem>, TableError> {
        let top = self.table.top_rows(column, n)?;
        let first = top.text(primary.0)?;
        let second = top.text(secondary.0)?;

        Ok(top
            .present(column)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| RankedItem {
                label: format!(
                    "{} ({})",
                    truncate(first[row], primary.1),
                    truncate(second[row], secondary.1)
                ),
                value,
            })
            .collect())
    }

    fn cross_tab(
        &self,
        row_key: &str,
        column_key: &str,
        columns: &[&str],
        value: &str,
        filters: &[RowFilter],
    ) -> Result<CrossTab, TableError> {
        let selected = self.selection(filters)?;
        let rows = selected.distinct(row_key)?;

        let cells = rows
            .iter()
            .map(|row| {
                let members = selected.rows_where(row_key, row)?;
                columns
                    .iter()
                    .map(|c| {
                        let cell = members.rows_where(column_key, c)?.present(value)?;
                        Ok(StatsCalculator::mean(&cell).unwrap_or(0.0))
                    })
                    .collect::<Result<Vec<f64>, TableError>>()
            })
            .collect::<Result<Vec<_>, TableError>>()?;

        Ok(CrossTab {
            rows,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            cells,
        })
    }

    /// Turn aggregated data into a drawable figure.
    pub fn build_figure(descriptor: &AnalysisDescriptor, data: &AnalysisData) -> Figure {
        let spec = &descriptor.chart;
        let mut secondary = None;
        let mut error_bars = None;

        let (categories, series) = match data {
            AnalysisData::Grouped(result) => {
                let categories = result.keys().iter().map(|k| k.to_string()).collect();
                let series_of = |i: usize| {
                    let values = result.column(i);
                    BarSeries {
                        name: result.measures[i].clone(),
                        colors: colors_for(spec.coloring, i, &values),
                        values,
                        labels: spec.labels,
                    }
                };
                let series = match spec.kind {
                    ChartKind::ErrorBar if result.measures.len() >= 3 => {
                        error_bars = Some(
                            result
                                .rows
                                .iter()
                                .map(|r| (r.values[1], r.values[2]))
                                .collect(),
                        );
                        vec![series_of(0)]
                    }
                    ChartKind::GroupedBar => (0..result.measures.len()).map(series_of).collect(),
                    ChartKind::DualAxisBar if result.measures.len() >= 2 => {
                        let mut right = series_of(1);
                        right.labels = None;
                        secondary = Some(right);
                        vec![series_of(0)]
                    }
                    _ => vec![series_of(0)],
                };
                (categories, series)
            }
            AnalysisData::Ranked(items) => {
                let values: Vec<f64> = items.iter().map(|item| item.value).collect();
                let series = BarSeries {
                    name: descriptor.name.to_string(),
                    colors: colors_for(spec.coloring, 0, &values),
                    values,
                    labels: spec.labels,
                };
                (
                    items.iter().map(|item| item.label.clone()).collect(),
                    vec![series],
                )
            }
            AnalysisData::CrossTab(tab) => {
                let series = tab
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(j, name)| {
                        let values = tab.column_values(j);
                        BarSeries {
                            name: name.clone(),
                            colors: colors_for(spec.coloring, j, &values),
                            values,
                            labels: spec.labels,
                        }
                    })
                    .collect();
                (tab.rows.clone(), series)
            }
        };

        Figure {
            title: spec.title.to_string(),
            subtitle: (!spec.subtitle.is_empty()).then(|| spec.subtitle.to_string()),
            x_desc: spec.x_desc.to_string(),
            y_desc: spec.y_desc.to_string(),
            size_in: spec.size_in,
            orientation: match spec.kind {
                ChartKind::HorizontalBar => Orientation::Horizontal,
                _ => Orientation::Vertical,
            },
            categories,
            series,
            secondary,
            secondary_desc: spec.secondary_desc.to_string(),
            error_bars,
            bar_width: spec.bar_width,
            rotate_labels: spec.rotate_labels,
            legend: matches!(
                spec.kind,
                ChartKind::GroupedBar | ChartKind::DualAxisBar | ChartKind::ClusteredBar
            ),
        }
    }
}

fn colors_for(coloring: Coloring, series: usize, values: &[f64]) -> Vec<RGBColor> {
    match coloring {
        Coloring::Series(palette) if !palette.is_empty() => vec![palette[series % palette.len()]],
        Coloring::PerBar(palette) if !palette.is_empty() => palette.to_vec(),
        Coloring::Bands(bands) => values.iter().map(|&v| bands.color_for(v)).collect(),
        _ => vec![RGBColor(0, 0, 0)],
    }
}

/// First `chars` characters; a missing cell becomes empty text.
/// `column` equals one of `values`.
fn any_of<'v>(column: &str, values: impl IntoIterator<Item = &'v str>) -> Expr {
    values
        .into_iter()
        .fold(lit(false), |acc, v| acc.or(col(column).eq(lit(v))))
}

fn truncate(text: Option<&str>, chars: usize) -> String {
    text.unwrap_or_default().chars().take(chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::catalog::catalog;
    use crate::charts::style::{GREEN, RED, YELLOW};
    use crate::data::schema::*;
    use crate::data::{DataProcessor, MalformedPolicy};
    use polars::prelude::*;

    struct Rows<'r> {
        category: Vec<&'r str>,
        beverage: Vec<&'r str>,
        prep: Vec<&'r str>,
        calories: Vec<&'r str>,
    }

    fn rows<'r>(spec: &[(&'r str, &'r str, &'r str, &'r str)]) -> Rows<'r> {
        Rows {
            category: spec.iter().map(|r| r.0).collect(),
            beverage: spec.iter().map(|r| r.1).collect(),
            prep: spec.iter().map(|r| r.2).collect(),
            calories: spec.iter().map(|r| r.3).collect(),
        }
    }

    fn table(rows: &Rows, extra: Vec<Column>) -> MenuTable {
        let mut df = df!(
            CATEGORY => rows.category.clone(),
            BEVERAGE => rows.beverage.clone(),
            PREP => rows.prep.clone(),
            CALORIES => rows.calories.clone()
        )
        .unwrap();
        for column in extra {
            df.with_column(column).unwrap();
        }
        DataProcessor::normalize(df, MalformedPolicy::Strict).unwrap()
    }

    fn descriptor(ordinal: u8) -> AnalysisDescriptor {
        catalog()
            .into_iter()
            .find(|d| d.ordinal == ordinal)
            .unwrap()
    }

    fn engine_for<'a>(t: &'a MenuTable, style: &'a ChartStyle) -> AnalysisEngine<'a> {
        AnalysisEngine::new(t, style, std::path::Path::new("."))
    }

    fn grouped(data: AnalysisData) -> AggregateResult {
        match data {
            AnalysisData::Grouped(result) => result,
            other => panic!("expected grouped data, got {other:?}"),
        }
    }

    #[test]
    fn category_means_sorted_descending() {
        let t = table(
            &rows(&[
                ("Coffee", "Brewed", "Tall", "200"),
                ("Tea", "Chai", "Tall", "180"),
                ("Coffee", "Brewed", "Grande", "300"),
                ("Smoothies", "Banana", "Grande", "300"),
            ]),
            vec![],
        );
        let style = ChartStyle::default();
        let result = grouped(engine_for(&t, &style).compute(&descriptor(1)).unwrap());

        assert_eq!(result.keys(), vec!["Smoothies", "Coffee", "Tea"]);
        assert_eq!(result.column(0), vec![300.0, 250.0, 180.0]);
        // min / max of Coffee
        assert_eq!(result.rows[1].values[1..], [200.0, 300.0]);
    }

    #[test]
    fn missing_values_leave_the_denominator() {
        let spec: Vec<_> = (0..10).map(|_| ("Coffee", "Brewed", "Tall", "5")).collect();
        let caffeine = [
            "10", "varies", "20", "30", "Varies", "40", "50", "", "60", "70",
        ];
        let t = table(
            &rows(&spec),
            vec![Column::new(CAFFEINE.into(), caffeine.to_vec())],
        );
        let style = ChartStyle::default();
        let result = grouped(engine_for(&t, &style).compute(&descriptor(4)).unwrap());
        assert_eq!(result.column(0), vec![40.0]);
    }

    #[test]
    fn share_below_threshold_per_category() {
        let t = table(
            &rows(&[
                ("Tea", "Chai", "Short", "100"),
                ("Tea", "Chai", "Tall", "200"),
                ("Tea", "Chai", "Grande", "140"),
                ("Tea", "Chai", "Venti", "160"),
            ]),
            vec![],
        );
        let style = ChartStyle::default();
        let result = grouped(engine_for(&t, &style).compute(&descriptor(8)).unwrap());
        assert_eq!(result.column(0), vec![50.0]);
    }

    #[test]
    fn size_chart_follows_vocabulary_order() {
        let t = table(
            &rows(&[
                ("Coffee", "Latte", "Venti Nonfat Milk", "240"),
                ("Coffee", "Latte", "Short Nonfat Milk", "80"),
                ("Coffee", "Espresso", "Doppio", "10"),
                ("Coffee", "Latte", "Tall Soymilk", "130"),
            ]),
            vec![],
        );
        let style = ChartStyle::default();
        let result = grouped(engine_for(&t, &style).compute(&descriptor(3)).unwrap());
        assert_eq!(result.keys(), vec!["Short", "Tall", "Venti"]);
        assert_eq!(result.column(0), vec![80.0, 130.0, 240.0]);
    }

    #[test]
    fn portfolio_counts_ascending() {
        let t = table(
            &rows(&[
                ("Coffee", "a", "Tall", "1"),
                ("Tea", "b", "Tall", "1"),
                ("Coffee", "c", "Tall", "1"),
                ("Smoothies", "d", "Tall", "1"),
                ("Coffee", "e", "Tall", "1"),
                ("Tea", "f", "Tall", "1"),
            ]),
            vec![],
        );
        let style = ChartStyle::default();
        let result = grouped(engine_for(&t, &style).compute(&descriptor(6)).unwrap());
        assert_eq!(result.keys(), vec!["Smoothies", "Tea", "Coffee"]);
        assert_eq!(result.column(0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn top_five_by_calories_with_truncated_labels() {
        let t = table(
            &rows(&[
                ("Coffee", "Brewed", "Short", "80"),
                ("Frappuccino", "Java Chip Frappuccino Blended Coffee", "Venti Nonfat Milk", "450"),
                ("Coffee", "Latte", "Tall", "120"),
                ("Signature", "White Chocolate Mocha", "Venti 2% Milk", "600"),
                ("Coffee", "Mocha", "Grande", "300"),
                ("Tea", "Chai", "Tall", "90"),
            ]),
            vec![],
        );
        let mut top5 = descriptor(10);
        if let AnalysisPlan::TopN { n, .. } = &mut top5.plan {
            *n = 5;
        }
        let style = ChartStyle::default();
        let data = engine_for(&t, &style).compute(&top5).unwrap();
        let AnalysisData::Ranked(items) = data else {
            panic!("expected ranked data");
        };
        let values: Vec<f64> = items.iter().map(|i| i.value).collect();
        assert_eq!(values, vec![600.0, 450.0, 300.0, 120.0, 90.0]);
        assert_eq!(items[1].label, "Java Chip Frappuccino Ble (Venti Nonfat Mi)");
    }

    #[test]
    fn size_progression_reindexes_with_zeros() {
        let t = table(
            &rows(&[
                ("A", "x", "Tall", "100"),
                ("A", "x", "Grande", "200"),
                ("A", "x", "Grande", "220"),
                ("B", "y", "Short", "50"),
                ("B", "y", "Doppio", "999"),
            ]),
            vec![],
        );
        let style = ChartStyle::default();
        let data = engine_for(&t, &style).compute(&descriptor(12)).unwrap();
        let AnalysisData::CrossTab(tab) = data else {
            panic!("expected a cross tab");
        };
        assert_eq!(tab.rows, vec!["A", "B"]);
        assert_eq!(tab.columns, vec!["Short", "Tall", "Grande", "Venti"]);
        assert_eq!(tab.cells[0], vec![0.0, 100.0, 210.0, 0.0]);
        assert_eq!(tab.cells[1], vec![50.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn absent_column_fails_only_that_analysis() {
        let t = table(&rows(&[("Coffee", "Brewed", "Tall", "5")]), vec![]);
        let style = ChartStyle::default();
        let engine = engine_for(&t, &style);

        let err = engine.compute(&descriptor(9)).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingColumn { ref column, .. } if column == SODIUM
        ));
        assert!(engine.compute(&descriptor(1)).is_ok());
    }

    #[test]
    fn nothing_after_filtering_is_empty() {
        let t = table(
            &rows(&[("Coffee", "Brewed", "Tall", "5"), ("Tea", "Chai", "Tall", "0")]),
            vec![Column::new(CAFFEINE.into(), ["varies", "0"].to_vec())],
        );
        let style = ChartStyle::default();
        let err = engine_for(&t, &style).compute(&descriptor(4)).unwrap_err();
        assert!(matches!(err, AnalysisError::Empty { .. }));
    }

    #[test]
    fn figures_carry_whiskers_and_bands() {
        let result = AggregateResult {
            key_column: CATEGORY.into(),
            measures: vec!["Average".into(), "Min".into(), "Max".into()],
            rows: vec![
                AggregateRow {
                    key: "Smoothies".into(),
                    values: vec![300.0, 250.0, 350.0],
                },
                AggregateRow {
                    key: "Tea".into(),
                    values: vec![180.0, 0.0, 400.0],
                },
            ],
        };
        let fig = AnalysisEngine::build_figure(&descriptor(1), &AnalysisData::Grouped(result));
        assert_eq!(fig.categories, vec!["Smoothies", "Tea"]);
        assert_eq!(fig.series.len(), 1);
        assert_eq!(fig.error_bars, Some(vec![(250.0, 350.0), (0.0, 400.0)]));
        assert_eq!(fig.orientation, Orientation::Vertical);

        let protein = AggregateResult {
            key_column: CATEGORY.into(),
            measures: vec!["Average Protein".into()],
            rows: [("a", 12.0), ("b", 7.0), ("c", 2.0)]
                .iter()
                .map(|(k, v)| AggregateRow {
                    key: k.to_string(),
                    values: vec![*v],
                })
                .collect(),
        };
        let fig = AnalysisEngine::build_figure(&descriptor(7), &AnalysisData::Grouped(protein));
        assert_eq!(fig.series[0].colors, vec![GREEN, YELLOW, RED]);
    }

    #[test]
    fn dual_axis_figure_moves_second_measure_right() {
        let result = AggregateResult {
            key_column: MILK_TYPE.into(),
            measures: vec!["Calories".into(), "Total Fat".into()],
            rows: vec![AggregateRow {
                key: "Soymilk".into(),
                values: vec![150.0, 3.5],
            }],
        };
        let fig = AnalysisEngine::build_figure(&descriptor(5), &AnalysisData::Grouped(result));
        assert_eq!(fig.series.len(), 1);
        let right = fig.secondary.as_ref().expect("secondary series");
        assert_eq!(right.values, vec![3.5]);
        assert_eq!(fig.slot_count(), 2);
        assert!(fig.legend);
    }

    #[test]
    fn missing_output_directory_is_a_render_error() {
        let t = table(&rows(&[("Coffee", "Brewed", "Tall", "5")]), vec![]);
        let style = ChartStyle::default();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("charts");
        let engine = AnalysisEngine::new(&t, &style, &missing);

        let err = engine.run(&descriptor(1)).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Render {
                source: RenderError::MissingDirectory(_),
                ..
            }
        ));
        assert!(!missing.exists());
    }
}
