//! Static Chart Renderer
//! Draws a [`Figure`] with plotters and writes it as PNG or SVG.
//!
//! Layout:
//! 1. Title centered at the top, optional subtitle as the chart caption
//! 2. Plot area with a category axis and one (or two) value axes
//! 3. Value grid lines only, at `grid_alpha`
//! 4. Optional legend in the upper corner

use crate::charts::axis::CategoryAxis;
use crate::charts::figure::{slot_span, BarSeries, Figure, Orientation};
use crate::charts::style::{ChartStyle, ImageFormat, ERROR_GREY};
use plotters::chart::ChartContext;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Output directory does not exist: {0}")]
    MissingDirectory(PathBuf),
    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),
    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, RenderError>;

type VerticalChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<CategoryAxis, RangedCoordf64>>;

fn drawing<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn config<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::ChartConfig(e.to_string())
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render `figure` to `path`. The parent directory must already exist.
    pub fn render(figure: &Figure, style: &ChartStyle, path: &Path) -> Result<()> {
        Self::check_target(path)?;
        figure.validate().map_err(RenderError::InvalidData)?;

        let size = style.pixel_size(figure.size_in);
        match style.format {
            ImageFormat::Png => {
                Self::draw(BitMapBackend::new(path, size).into_drawing_area(), figure, style)
            }
            ImageFormat::Svg => {
                Self::draw(SVGBackend::new(path, size).into_drawing_area(), figure, style)
            }
        }
    }

    fn check_target(path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(RenderError::MissingDirectory(parent.to_path_buf()));
        }
        Ok(())
    }

    fn draw<DB: DrawingBackend>(
        root: DrawingArea<DB, Shift>,
        figure: &Figure,
        style: &ChartStyle,
    ) -> Result<()> {
        root.fill(&WHITE).map_err(drawing)?;
        let area = root
            .titled(&figure.title, style.title_font())
            .map_err(drawing)?;

        match figure.orientation {
            Orientation::Vertical => Self::draw_vertical(&area, figure, style)?,
            Orientation::Horizontal => Self::draw_horizontal(&area, figure, style)?,
        }

        root.present().map_err(drawing)?;
        Ok(())
    }

    fn draw_vertical<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        figure: &Figure,
        style: &ChartStyle,
    ) -> Result<()> {
        let n = figure.categories.len();
        let (lo, hi) = figure.value_range();
        let tick_px = style.px(style.tick_size);
        let margin = style.px(10.0) as u32;

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(margin)
            .x_label_area_size(Self::category_extent(
                &figure.categories,
                tick_px,
                figure.rotate_labels,
            ) + style.px(style.axis_desc_size * 2.0) as u32)
            .y_label_area_size((tick_px * 4.0) as u32 + style.px(style.axis_desc_size * 2.0) as u32);
        if figure.secondary.is_some() {
            builder.right_y_label_area_size(
                (tick_px * 4.0) as u32 + style.px(style.axis_desc_size * 2.0) as u32,
            );
        }
        if let Some(subtitle) = &figure.subtitle {
            builder.caption(subtitle, style.subtitle_font());
        }
        let mut chart = builder
            .build_cartesian_2d(CategoryAxis::new(n), lo..hi)
            .map_err(config)?;

        let tick_font = if figure.rotate_labels {
            style.tick_font().transform(FontTransform::Rotate90)
        } else {
            style.tick_font()
        };
        let left_axis_font: TextStyle = match &figure.secondary {
            Some(_) => style.tick_font().color(&figure.series[0].color_at(0)),
            None => style.tick_font().into(),
        };
        let category_label = |v: &f64| CategoryAxis::label(&figure.categories, *v);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(&BLACK.mix(style.grid_alpha))
            .light_line_style(&WHITE.mix(0.0))
            .x_labels(n)
            .x_label_formatter(&category_label)
            .x_label_style(tick_font)
            .y_label_style(left_axis_font)
            .x_desc(figure.x_desc.as_str())
            .y_desc(figure.y_desc.as_str())
            .axis_desc_style(style.axis_desc_font())
            .draw()
            .map_err(drawing)?;

        let slots = figure.slot_count();
        for (slot, series) in figure.series.iter().enumerate() {
            Self::draw_vertical_series(&mut chart, figure, series, slot, slots, (lo, hi), style)?;
        }

        if let Some(ranges) = &figure.error_bars {
            let whisker = ERROR_GREY.mix(0.6).stroke_width(2);
            let cap = figure.bar_width / 8.0;
            chart
                .draw_series(ranges.iter().enumerate().flat_map(|(i, &(low, high))| {
                    let x = i as f64;
                    [
                        PathElement::new(vec![(x, low), (x, high)], whisker),
                        PathElement::new(vec![(x - cap, low), (x + cap, low)], whisker),
                        PathElement::new(vec![(x - cap, high), (x + cap, high)], whisker),
                    ]
                }))
                .map_err(drawing)?;
        }

        match (&figure.secondary, figure.secondary_range()) {
            (Some(secondary), Some((slo, shi))) => {
                let mut dual = chart.set_secondary_coord(CategoryAxis::new(n), slo..shi);
                dual.configure_secondary_axes()
                    .y_desc(figure.secondary_desc.as_str())
                    .label_style(style.tick_font().color(&secondary.color_at(0)))
                    .axis_desc_style(style.axis_desc_font())
                    .draw()
                    .map_err(drawing)?;

                let alpha = style.bar_alpha;
                let color = secondary.color_at(0);
                dual.draw_secondary_series(secondary.values.iter().enumerate().map(|(i, &v)| {
                    let (x0, x1) = slot_span(i, slots - 1, slots, figure.bar_width);
                    Rectangle::new([(x0, 0.0), (x1, v)], color.mix(alpha).filled())
                }))
                .map_err(drawing)?
                .label(secondary.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.mix(alpha).filled()));

                if figure.legend {
                    Self::draw_legend(&mut dual, style, SeriesLabelPosition::UpperLeft)?;
                }
            }
            _ => {
                if figure.legend {
                    Self::draw_legend(&mut chart, style, SeriesLabelPosition::UpperRight)?;
                }
            }
        }
        Ok(())
    }

    fn draw_vertical_series<DB: DrawingBackend>(
        chart: &mut VerticalChart<'_, DB>,
        figure: &Figure,
        series: &BarSeries,
        slot: usize,
        slots: usize,
        (lo, hi): (f64, f64),
        style: &ChartStyle,
    ) -> Result<()> {
        let alpha = style.bar_alpha;
        let swatch = series.color_at(0);
        chart
            .draw_series(series.values.iter().enumerate().map(|(i, &v)| {
                let (x0, x1) = slot_span(i, slot, slots, figure.bar_width);
                Rectangle::new([(x0, 0.0), (x1, v)], series.color_at(i).mix(alpha).filled())
            }))
            .map_err(drawing)?
            .label(series.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], swatch.mix(alpha).filled()));

        if let Some(format) = series.labels {
            let font = style
                .value_label_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            let offset = (hi - lo) * 0.01;
            chart
                .draw_series(series.values.iter().enumerate().map(|(i, &v)| {
                    let (x0, x1) = slot_span(i, slot, slots, figure.bar_width);
                    Text::new(format.format(v), ((x0 + x1) / 2.0, v + offset), font.clone())
                }))
                .map_err(drawing)?;
        }
        Ok(())
    }

    fn draw_horizontal<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        figure: &Figure,
        style: &ChartStyle,
    ) -> Result<()> {
        let n = figure.categories.len();
        let (lo, hi) = figure.value_range();
        let tick_px = style.px(style.tick_size);
        let desc_px = style.px(style.axis_desc_size * 2.0) as u32;

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(style.px(10.0) as u32)
            .x_label_area_size((tick_px * 2.0) as u32 + desc_px)
            .y_label_area_size(Self::category_extent(&figure.categories, tick_px, true) + desc_px);
        if let Some(subtitle) = &figure.subtitle {
            builder.caption(subtitle, style.subtitle_font());
        }
        let mut chart = builder
            .build_cartesian_2d(lo..hi, CategoryAxis::new(n))
            .map_err(config)?;

        let category_label = |v: &f64| CategoryAxis::label(&figure.categories, *v);
        chart
            .configure_mesh()
            .disable_y_mesh()
            .bold_line_style(&BLACK.mix(style.grid_alpha))
            .light_line_style(&WHITE.mix(0.0))
            .y_labels(n)
            .y_label_formatter(&category_label)
            .label_style(style.tick_font())
            .x_desc(figure.x_desc.as_str())
            .y_desc(figure.y_desc.as_str())
            .axis_desc_style(style.axis_desc_font())
            .draw()
            .map_err(drawing)?;

        let alpha = style.bar_alpha;
        let slots = figure.series.len();
        let offset = (hi - lo) * 0.01;
        for (slot, series) in figure.series.iter().enumerate() {
            chart
                .draw_series(series.values.iter().enumerate().map(|(i, &v)| {
                    let (y0, y1) = slot_span(i, slot, slots, figure.bar_width);
                    Rectangle::new([(0.0, y0), (v, y1)], series.color_at(i).mix(alpha).filled())
                }))
                .map_err(drawing)?;

            if let Some(format) = series.labels {
                let font = style
                    .value_label_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Left, VPos::Center));
                chart
                    .draw_series(series.values.iter().enumerate().map(|(i, &v)| {
                        let (y0, y1) = slot_span(i, slot, slots, figure.bar_width);
                        Text::new(format.format(v), (v + offset, (y0 + y1) / 2.0), font.clone())
                    }))
                    .map_err(drawing)?;
            }
        }
        Ok(())
    }

    fn draw_legend<'a, DB: DrawingBackend + 'a, CT: CoordTranslate>(
        chart: &mut ChartContext<'a, DB, CT>,
        style: &ChartStyle,
        position: SeriesLabelPosition,
    ) -> Result<()> {
        chart
            .configure_series_labels()
            .position(position)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.3))
            .label_font(style.tick_font())
            .draw()
            .map_err(drawing)
    }

    /// Pixels needed for the widest category label along (or across) the axis.
    fn category_extent(categories: &[String], tick_px: f64, across: bool) -> u32 {
        if !across {
            return (tick_px * 2.5) as u32;
        }
        let longest = categories
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);
        (longest as f64 * tick_px * 0.6 + tick_px) as u32
    }
}
