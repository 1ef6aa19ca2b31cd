//! Charts module - figure model, styling and static rendering

mod axis;
mod figure;
mod renderer;
pub mod style;

pub use axis::CategoryAxis;
pub use figure::{slot_span, BarSeries, Figure, Orientation, ValueFormat};
pub use renderer::{ChartRenderer, RenderError};
pub use style::{ChartStyle, ImageFormat, ThresholdBands};
