//! The fixed set of menu analyses, in output order.

use crate::analysis::descriptor::{
    AnalysisDescriptor, AnalysisPlan, ChartKind, ChartSpec, Coloring, Measure, RowFilter,
};
use crate::charts::style::{
    BROWN, DARK_GREEN, GREEN, GREENS, LIGHT_GREEN, MINT, RED, YELLOW,
};
use crate::charts::{ThresholdBands, ValueFormat};
use crate::data::schema::{
    BEVERAGE, CAFFEINE, CALORIES, CARBOHYDRATES, CATEGORY, MILK_FALLBACK, MILK_TYPE, PREP,
    PROTEIN, SIZE, SIZE_ORDER, SODIUM, SUGARS, TOTAL_FAT,
};
use crate::stats::{GroupOrder, Statistic};
use plotters::style::RGBColor;

const WIDE: (f64, f64) = (14.0, 7.0);
const STANDARD: (f64, f64) = (12.0, 6.0);
const TALL: (f64, f64) = (12.0, 8.0);

const SIZE_COLORS: [RGBColor; 4] = [DARK_GREEN, GREEN, LIGHT_GREEN, MINT];

/// Calories below this count as a low-calorie option.
pub const LOW_CALORIE_THRESHOLD: f64 = 150.0;

const PROTEIN_BANDS: ThresholdBands = ThresholdBands {
    high: 10.0,
    medium: 5.0,
};
const COVERAGE_BANDS: ThresholdBands = ThresholdBands {
    high: 50.0,
    medium: 25.0,
};

fn by_category(measures: Vec<Measure>, order: GroupOrder) -> AnalysisPlan {
    AnalysisPlan::Grouped {
        key: CATEGORY,
        filters: Vec::new(),
        measures,
        order,
    }
}

fn chart(kind: ChartKind, title: &'static str, subtitle: &'static str) -> ChartSpec {
    ChartSpec {
        kind,
        title,
        subtitle,
        x_desc: "Beverage Category",
        y_desc: "",
        secondary_desc: "",
        size_in: WIDE,
        bar_width: 0.8,
        coloring: Coloring::Series(&[GREEN]),
        labels: None,
        rotate_labels: true,
    }
}

/// All twelve analyses, ordered by ordinal.
pub fn catalog() -> Vec<AnalysisDescriptor> {
    vec![
        AnalysisDescriptor {
            ordinal: 1,
            slug: "category_calorie_analysis",
            name: "Category Performance Analysis",
            plan: by_category(
                vec![
                    Measure::of(CALORIES, Statistic::Mean, "Average Calories"),
                    Measure::of(CALORIES, Statistic::Min, "Minimum Calories"),
                    Measure::of(CALORIES, Statistic::Max, "Maximum Calories"),
                ],
                GroupOrder::Descending(0),
            ),
            chart: ChartSpec {
                y_desc: "Calories",
                bar_width: 0.6,
                ..chart(
                    ChartKind::ErrorBar,
                    "Menu Portfolio Analysis: Average Calories by Category",
                    "(Error bars show min-max range)",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 2,
            slug: "sugar_content_analysis",
            name: "Sugar Content Analysis",
            plan: by_category(
                vec![
                    Measure::of(SUGARS, Statistic::Mean, "Average Sugar"),
                    Measure::of(SUGARS, Statistic::Median, "Median Sugar"),
                ],
                GroupOrder::Descending(0),
            ),
            chart: ChartSpec {
                y_desc: "Sugar Content (grams)",
                bar_width: 0.7,
                coloring: Coloring::Series(&[RED, YELLOW]),
                ..chart(
                    ChartKind::GroupedBar,
                    "Health Impact Assessment: Sugar Content Across Product Lines",
                    "(Higher values indicate less health-conscious positioning)",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 3,
            slug: "size_impact_analysis",
            name: "Size Selection Impact",
            plan: AnalysisPlan::Grouped {
                key: SIZE,
                filters: vec![RowFilter::KeyIn(SIZE, &SIZE_ORDER)],
                measures: vec![Measure::of(CALORIES, Statistic::Mean, "Average Calories")],
                order: GroupOrder::Fixed(&SIZE_ORDER),
            },
            chart: ChartSpec {
                x_desc: "Size",
                y_desc: "Average Calories",
                size_in: STANDARD,
                coloring: Coloring::PerBar(&SIZE_COLORS),
                labels: Some(ValueFormat::Whole),
                rotate_labels: false,
                ..chart(
                    ChartKind::Bar,
                    "Upselling Opportunity: Calorie Increase by Size Upgrade",
                    "(Indicates potential for larger portion sales)",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 4,
            slug: "caffeine_positioning",
            name: "Caffeine Levels",
            plan: AnalysisPlan::Grouped {
                key: CATEGORY,
                filters: vec![RowFilter::Positive(CAFFEINE)],
                measures: vec![Measure::of(CAFFEINE, Statistic::Mean, "Average Caffeine")],
                order: GroupOrder::Descending(0),
            },
            chart: ChartSpec {
                x_desc: "Average Caffeine Content (mg)",
                y_desc: "Beverage Category",
                coloring: Coloring::Series(&[BROWN]),
                labels: Some(ValueFormat::Milligrams),
                ..chart(
                    ChartKind::HorizontalBar,
                    "Energy Positioning: Caffeine Content by Category",
                    "(Critical for functional benefit marketing)",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 5,
            slug: "milk_type_impact",
            name: "Milk Type Impact",
            plan: AnalysisPlan::Grouped {
                key: MILK_TYPE,
                filters: vec![RowFilter::KeyNot(MILK_TYPE, MILK_FALLBACK)],
                measures: vec![
                    Measure::of(CALORIES, Statistic::Mean, "Calories"),
                    Measure::of(TOTAL_FAT, Statistic::Mean, "Total Fat"),
                ],
                order: GroupOrder::KeyAscending,
            },
            chart: ChartSpec {
                x_desc: "Milk Type",
                y_desc: "Average Calories",
                secondary_desc: "Average Total Fat (g)",
                size_in: STANDARD,
                bar_width: 0.7,
                coloring: Coloring::Series(&[GREEN, RED]),
                rotate_labels: false,
                ..chart(
                    ChartKind::DualAxisBar,
                    "Customization Economics: Nutritional Impact of Milk Choices",
                    "(Informs premium pricing and health-conscious positioning)",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 6,
            slug: "product_portfolio_distribution",
            name: "Product Line Distribution",
            plan: by_category(vec![Measure::rows("SKU Count")], GroupOrder::Ascending(0)),
            chart: ChartSpec {
                x_desc: "Number of SKUs",
                y_desc: "Beverage Category",
                size_in: STANDARD,
                coloring: Coloring::Series(&[LIGHT_GREEN]),
                labels: Some(ValueFormat::Whole),
                ..chart(
                    ChartKind::HorizontalBar,
                    "Portfolio Complexity: SKU Count by Category",
                    "(Identifies potential for menu simplification or expansion)",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 7,
            slug: "protein_nutrition_value",
            name: "Protein Content",
            plan: by_category(
                vec![Measure::of(PROTEIN, Statistic::Mean, "Average Protein")],
                GroupOrder::Descending(0),
            ),
            chart: ChartSpec {
                y_desc: "Average Protein Content (g)",
                coloring: Coloring::Bands(PROTEIN_BANDS),
                ..chart(
                    ChartKind::Bar,
                    "Nutritional Differentiation: Protein Levels Across Categories",
                    "(Green: High protein (10g+) | Yellow: Medium (5-10g) | Red: Low (<5g))",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 8,
            slug: "low_calorie_coverage",
            name: "Low-Calorie Option Coverage",
            plan: by_category(
                vec![Measure::of(
                    CALORIES,
                    Statistic::ShareBelow(LOW_CALORIE_THRESHOLD),
                    "Low-Calorie Share",
                )],
                GroupOrder::Descending(0),
            ),
            chart: ChartSpec {
                x_desc: "Percentage of Low-Calorie Options (<150 cal)",
                y_desc: "Beverage Category",
                size_in: STANDARD,
                coloring: Coloring::Bands(COVERAGE_BANDS),
                labels: Some(ValueFormat::Percent),
                ..chart(
                    ChartKind::HorizontalBar,
                    "Health Positioning Strategy: Low-Calorie Product Penetration by Category",
                    "(Green: Strong (50%+) | Yellow: Moderate (25-50%) | Red: Weak (<25%))",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 9,
            slug: "sodium_health_risk",
            name: "Sodium Levels",
            plan: by_category(
                vec![
                    Measure::of(SODIUM, Statistic::Mean, "Average Sodium"),
                    Measure::of(SODIUM, Statistic::Max, "Maximum Sodium"),
                ],
                GroupOrder::Descending(0),
            ),
            chart: ChartSpec {
                y_desc: "Sodium Content (mg)",
                bar_width: 0.7,
                coloring: Coloring::Series(&[GREEN, RED]),
                ..chart(
                    ChartKind::GroupedBar,
                    "Health Compliance Assessment: Sodium Levels by Category",
                    "(Critical for health regulations and customer wellness concerns)",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 10,
            slug: "highest_calorie_products",
            name: "Highest Calorie Items",
            plan: AnalysisPlan::TopN {
                column: CALORIES,
                n: 15,
                primary: (BEVERAGE, 25),
                secondary: (PREP, 15),
            },
            chart: ChartSpec {
                x_desc: "Calories",
                y_desc: "Product",
                size_in: TALL,
                coloring: Coloring::Series(&[RED]),
                labels: Some(ValueFormat::Whole),
                ..chart(
                    ChartKind::HorizontalBar,
                    "Health Liability Assessment: Top 15 Highest-Calorie Products",
                    "(Potential targets for reformulation or health disclaimers)",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 11,
            slug: "carbohydrate_energy_analysis",
            name: "Carbohydrate Content",
            plan: by_category(
                vec![Measure::of(CARBOHYDRATES, Statistic::Mean, "Average Carbohydrates")],
                GroupOrder::Descending(0),
            ),
            chart: ChartSpec {
                y_desc: "Average Carbohydrates (g)",
                coloring: Coloring::Series(&[YELLOW]),
                labels: Some(ValueFormat::OneDecimal),
                ..chart(
                    ChartKind::Bar,
                    "Energy Delivery Analysis: Carbohydrate Levels by Category",
                    "(Indicates quick energy delivery and satiety potential)",
                )
            },
        },
        AnalysisDescriptor {
            ordinal: 12,
            slug: "size_upgrade_opportunity",
            name: "Size Upgrade Opportunity",
            plan: AnalysisPlan::CrossTab {
                row_key: CATEGORY,
                column_key: SIZE,
                columns: &SIZE_ORDER,
                value: CALORIES,
                filters: vec![
                    RowFilter::TopFrequent(CATEGORY, 5),
                    RowFilter::KeyIn(SIZE, &SIZE_ORDER),
                ],
            },
            chart: ChartSpec {
                y_desc: "Average Calories",
                bar_width: 0.5,
                coloring: Coloring::Series(&GREENS),
                ..chart(
                    ChartKind::ClusteredBar,
                    "Upselling Strategy: Calorie Progression by Size Across Top Categories",
                    "(Larger gaps indicate stronger upsell opportunities)",
                )
            },
        },
    ]
}

/// Analyses whose ordinal is listed; all of them when `ordinals` is empty.
pub fn select(ordinals: &[u8]) -> Vec<AnalysisDescriptor> {
    catalog()
        .into_iter()
        .filter(|d| ordinals.is_empty() || ordinals.contains(&d.ordinal))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_analyses_in_ordinal_order() {
        let all = catalog();
        assert_eq!(all.len(), 12);
        for (i, d) in all.iter().enumerate() {
            assert_eq!(d.ordinal as usize, i + 1);
        }
    }

    #[test]
    fn slugs_match_output_names() {
        let slugs: Vec<&str> = catalog().iter().map(|d| d.slug).collect();
        assert_eq!(
            slugs,
            vec![
                "category_calorie_analysis",
                "sugar_content_analysis",
                "size_impact_analysis",
                "caffeine_positioning",
                "milk_type_impact",
                "product_portfolio_distribution",
                "protein_nutrition_value",
                "low_calorie_coverage",
                "sodium_health_risk",
                "highest_calorie_products",
                "carbohydrate_energy_analysis",
                "size_upgrade_opportunity",
            ]
        );
    }

    #[test]
    fn selection_by_ordinal() {
        assert_eq!(select(&[]).len(), 12);
        let picked: Vec<u8> = select(&[10, 3]).iter().map(|d| d.ordinal).collect();
        assert_eq!(picked, vec![3, 10]);
        assert!(select(&[42]).is_empty());
    }

    #[test]
    fn multi_measure_charts_have_enough_colours() {
        for d in catalog() {
            if let (AnalysisPlan::Grouped { measures, .. }, Coloring::Series(colors)) =
                (&d.plan, d.chart.coloring)
            {
                if matches!(d.chart.kind, ChartKind::GroupedBar | ChartKind::DualAxisBar) {
                    assert!(colors.len() >= measures.len(), "{}", d.slug);
                }
            }
        }
    }
}
