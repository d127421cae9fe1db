pub mod content;
pub mod palette;
pub mod primitives;

pub use content::{ContentModel, MetricSet, RevenueEntry, SeriesPoint};
pub use palette::{Color, Palette, Swatch};
pub use primitives::{decimal_to_f64, period_start};
