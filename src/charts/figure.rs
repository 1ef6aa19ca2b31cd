//! Backend-independent description of one bar chart.

use plotters::style::RGBColor;

/// Precision of the text printed over each bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// `312`
    Whole,
    /// `41.3`
    OneDecimal,
    /// `37.5%`
    Percent,
    /// `145 mg`
    Milligrams,
}

impl ValueFormat {
    pub fn format(&self, value: f64) -> String {
        match self {
            ValueFormat::Whole => format!("{:.0}", value),
            ValueFormat::OneDecimal => format!("{:.1}", value),
            ValueFormat::Percent => format!("{:.1}%", value),
            ValueFormat::Milligrams => format!("{:.0} mg", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// One bar per category. A single colour paints every bar; otherwise
/// `colors[i]` paints bar `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
    pub colors: Vec<RGBColor>,
    pub labels: Option<ValueFormat>,
}

impl BarSeries {
    pub fn color_at(&self, index: usize) -> RGBColor {
        match self.colors.len() {
            0 => RGBColor(0, 0, 0),
            1 => self.colors[0],
            n => self.colors[index % n],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub subtitle: Option<String>,
    pub x_desc: String,
    pub y_desc: String,
    /// Width and height in inches.
    pub size_in: (f64, f64),
    pub orientation: Orientation,
    pub categories: Vec<String>,
    /// Bars sharing the primary value axis, side by side within a category.
    pub series: Vec<BarSeries>,
    /// Bars on a right-hand value axis, placed after the primary ones.
    pub secondary: Option<BarSeries>,
    pub secondary_desc: String,
    /// Per-category `(low, high)` whiskers drawn over the first series.
    pub error_bars: Option<Vec<(f64, f64)>>,
    /// Total width of a category's bar cluster, in category slots.
    pub bar_width: f64,
    pub rotate_labels: bool,
    pub legend: bool,
}

impl Figure {
    /// Number of bars per category.
    pub fn slot_count(&self) -> usize {
        self.series.len() + usize::from(self.secondary.is_some())
    }

    /// Inconsistent lengths are reported as a message.
    pub fn validate(&self) -> Result<(), String> {
        if self.categories.is_empty() {
            return Err("figure has no categories".to_string());
        }
        if self.series.is_empty() {
            return Err("figure has no series".to_string());
        }
        let n = self.categories.len();
        for series in self.series.iter().chain(self.secondary.iter()) {
            if series.values.len() != n {
                return Err(format!(
                    "series '{}' has {} values for {} categories",
                    series.name,
                    series.values.len(),
                    n
                ));
            }
        }
        if let Some(ranges) = &self.error_bars {
            if ranges.len() != n {
                return Err(format!(
                    "{} error bars for {} categories",
                    ranges.len(),
                    n
                ));
            }
        }
        Ok(())
    }

    /// Primary value-axis range: starts at zero and leaves headroom for labels.
    pub fn value_range(&self) -> (f64, f64) {
        let values = self.series.iter().flat_map(|s| s.values.iter().copied());
        let whiskers = self
            .error_bars
            .iter()
            .flatten()
            .flat_map(|&(low, high)| [low, high]);
        padded_range(values.chain(whiskers))
    }

    pub fn secondary_range(&self) -> Option<(f64, f64)> {
        self.secondary
            .as_ref()
            .map(|s| padded_range(s.values.iter().copied()))
    }
}

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi - lo <= 0.0 {
        return (0.0, 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { 0.0 }, hi + pad)
}

/// Horizontal extent of bar `slot` of `slots` at category `index`.
pub fn slot_span(index: usize, slot: usize, slots: usize, cluster_width: f64) -> (f64, f64) {
    let slots = slots.max(1);
    let bar = cluster_width / slots as f64;
    let start = index as f64 - cluster_width / 2.0 + slot as f64 * bar;
    (start, start + bar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> BarSeries {
        BarSeries {
            name: "s".into(),
            values: values.to_vec(),
            colors: vec![RGBColor(1, 2, 3)],
            labels: None,
        }
    }

    fn figure(categories: &[&str], series: Vec<BarSeries>) -> Figure {
        Figure {
            title: "t".into(),
            subtitle: None,
            x_desc: String::new(),
            y_desc: String::new(),
            size_in: (12.0, 6.0),
            orientation: Orientation::Vertical,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            series,
            secondary: None,
            secondary_desc: String::new(),
            error_bars: None,
            bar_width: 0.6,
            rotate_labels: false,
            legend: false,
        }
    }

    #[test]
    fn value_formats() {
        assert_eq!(ValueFormat::Whole.format(312.4), "312");
        assert_eq!(ValueFormat::OneDecimal.format(41.26), "41.3");
        assert_eq!(ValueFormat::Percent.format(37.5), "37.5%");
        assert_eq!(ValueFormat::Milligrams.format(144.6), "145 mg");
    }

    #[test]
    fn paired_slots_straddle_the_tick() {
        let (a0, a1) = slot_span(2, 0, 2, 0.7);
        let (b0, b1) = slot_span(2, 1, 2, 0.7);
        assert!((a0 - 1.65).abs() < 1e-12);
        assert!((a1 - 2.0).abs() < 1e-12);
        assert!((b0 - 2.0).abs() < 1e-12);
        assert!((b1 - 2.35).abs() < 1e-12);
    }

    #[test]
    fn single_slot_is_centred() {
        let (x0, x1) = slot_span(0, 0, 1, 0.6);
        assert!((x0 + 0.3).abs() < 1e-12);
        assert!((x1 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn range_includes_whiskers() {
        let mut fig = figure(&["a", "b"], vec![series(&[100.0, 200.0])]);
        fig.error_bars = Some(vec![(50.0, 150.0), (120.0, 500.0)]);
        let (lo, hi) = fig.value_range();
        assert_eq!(lo, 0.0);
        assert!((hi - 550.0).abs() < 1e-9);
    }

    #[test]
    fn validation_catches_length_mismatch() {
        let fig = figure(&["a", "b"], vec![series(&[1.0])]);
        assert!(fig.validate().is_err());
        let fig = figure(&[], vec![series(&[])]);
        assert!(fig.validate().is_err());
        let fig = figure(&["a"], vec![series(&[1.0])]);
        assert!(fig.validate().is_ok());
    }

    #[test]
    fn flat_data_gets_a_unit_range() {
        let fig = figure(&["a"], vec![series(&[0.0])]);
        assert_eq!(fig.value_range(), (0.0, 1.0));
    }
}
