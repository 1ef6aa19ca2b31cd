//! Chart styling: palette, fonts, output format and pixel scaling.

use plotters::style::{FontDesc, FontFamily, FontStyle, RGBColor, TextStyle};

// Brand palette
pub const GREEN: RGBColor = RGBColor(0x00, 0x70, 0x4A);
pub const DARK_GREEN: RGBColor = RGBColor(0x1E, 0x39, 0x32);
pub const LIGHT_GREEN: RGBColor = RGBColor(0x00, 0xA8, 0x62);
pub const MINT: RGBColor = RGBColor(0x6F, 0xCD, 0xAA);
pub const RED: RGBColor = RGBColor(0xD6, 0x2B, 0x1F);
pub const YELLOW: RGBColor = RGBColor(0xFD, 0xB9, 0x13);
pub const BROWN: RGBColor = RGBColor(0x4E, 0x2A, 0x1E);
pub const ERROR_GREY: RGBColor = RGBColor(0x33, 0x33, 0x33);

/// Light-to-dark greens, one per size in a clustered chart.
pub const GREENS: [RGBColor; 4] = [
    RGBColor(0xC7, 0xE9, 0xC0),
    RGBColor(0x74, 0xC4, 0x76),
    RGBColor(0x23, 0x8B, 0x45),
    RGBColor(0x00, 0x44, 0x1B),
];

/// Colour bars by value: green at or above `high`, yellow at or above `medium`, red below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBands {
    pub high: f64,
    pub medium: f64,
}

impl ThresholdBands {
    pub fn color_for(&self, value: f64) -> RGBColor {
        if value >= self.high {
            GREEN
        } else if value >= self.medium {
            YELLOW
        } else {
            RED
        }
    }
}

/// Encoded image type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Presentation settings shared by every chart of a run.
///
/// Font sizes are in points and scale with `pixels_per_inch`.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub pixels_per_inch: u32,
    pub font_family: String,
    pub title_size: f64,
    pub subtitle_size: f64,
    pub axis_desc_size: f64,
    pub tick_size: f64,
    pub value_label_size: f64,
    pub bar_alpha: f64,
    pub grid_alpha: f64,
    pub format: ImageFormat,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            pixels_per_inch: 100,
            font_family: "sans-serif".to_string(),
            title_size: 14.0,
            subtitle_size: 11.0,
            axis_desc_size: 11.0,
            tick_size: 10.0,
            value_label_size: 10.0,
            bar_alpha: 0.8,
            grid_alpha: 0.3,
            format: ImageFormat::Png,
        }
    }
}

impl ChartStyle {
    /// Image size in pixels for a figure size in inches.
    pub fn pixel_size(&self, size_in: (f64, f64)) -> (u32, u32) {
        let ppi = self.pixels_per_inch as f64;
        (
            (size_in.0 * ppi).round().max(1.0) as u32,
            (size_in.1 * ppi).round().max(1.0) as u32,
        )
    }

    /// Points to pixels at the configured resolution.
    pub fn px(&self, points: f64) -> f64 {
        points * self.pixels_per_inch as f64 / 72.0
    }

    pub fn font(&self, points: f64) -> FontDesc<'_> {
        FontDesc::new(
            FontFamily::from(self.font_family.as_str()),
            self.px(points),
            FontStyle::Normal,
        )
    }

    pub fn bold(&self, points: f64) -> FontDesc<'_> {
        FontDesc::new(
            FontFamily::from(self.font_family.as_str()),
            self.px(points),
            FontStyle::Bold,
        )
    }

    pub fn title_font(&self) -> TextStyle<'_> {
        self.bold(self.title_size).into()
    }

    pub fn subtitle_font(&self) -> TextStyle<'_> {
        self.font(self.subtitle_size).into()
    }

    pub fn axis_desc_font(&self) -> TextStyle<'_> {
        self.bold(self.axis_desc_size).into()
    }

    pub fn tick_font(&self) -> FontDesc<'_> {
        self.font(self.tick_size)
    }

    pub fn value_label_font(&self) -> FontDesc<'_> {
        self.bold(self.value_label_size)
    }

    /// File name for an analysis: `NN_slug.<ext>`.
    pub fn file_name(&self, ordinal: u8, slug: &str) -> String {
        format!("{:02}_{}.{}", ordinal, slug, self.format.extension())
    }
}
