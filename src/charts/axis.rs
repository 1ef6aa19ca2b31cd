//! A discrete axis: category `i` sits at coordinate `i`, with half a slot of
//! padding on each side so bars of width < 1 never touch the plot edge.

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryAxis {
    count: usize,
}

impl CategoryAxis {
    pub fn new(count: usize) -> Self {
        Self {
            count: count.max(1),
        }
    }

    /// Tick label for an axis coordinate; empty between categories.
    pub fn label(labels: &[String], value: f64) -> String {
        let index = value.round();
        if (value - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        labels.get(index as usize).cloned().unwrap_or_default()
    }
}

impl Ranged for CategoryAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let range = self.range();
        let ratio = (value - range.start) / (range.end - range.start);
        limit.0 + ((limit.1 - limit.0) as f64 * ratio).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.max_num_points() == 0 {
            return Vec::new();
        }
        (0..self.count).map(|i| i as f64).collect()
    }

    fn range(&self) -> Range<f64> {
        -0.5..self.count as f64 - 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_slots_evenly() {
        let axis = CategoryAxis::new(4);
        assert_eq!(axis.map(&-0.5, (0, 400)), 0);
        assert_eq!(axis.map(&0.0, (0, 400)), 50);
        assert_eq!(axis.map(&3.0, (0, 400)), 350);
        assert_eq!(axis.map(&3.5, (0, 400)), 400);
        // inverted pixel range, as used for vertical axes
        assert_eq!(axis.map(&0.0, (400, 0)), 350);
    }

    #[test]
    fn labels_only_on_whole_indices() {
        let labels = vec!["Short".to_string(), "Tall".to_string()];
        assert_eq!(CategoryAxis::label(&labels, 1.0), "Tall");
        assert_eq!(CategoryAxis::label(&labels, 0.5), "");
        assert_eq!(CategoryAxis::label(&labels, 5.0), "");
        assert_eq!(CategoryAxis::label(&labels, -1.0), "");
    }

    #[test]
    fn empty_axis_keeps_a_slot() {
        assert_eq!(CategoryAxis::new(0).range(), -0.5..0.5);
    }
}
