use serde::{Deserialize, Serialize};

use crate::core::Swatch;

/// Which palette swatch plays which role in the charts, plus the numeric
/// styling both charts share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartTheme {
    pub line: Swatch,
    /// Alpha of the area fill under the line, 0..=255.
    pub line_fill_alpha: u8,
    pub point: Swatch,
    pub point_border: Swatch,
    pub point_hover: Swatch,
    pub tooltip_background: Swatch,
    pub tooltip_text: Swatch,
    pub tooltip_border: Swatch,
    pub grid: Swatch,
    pub grid_alpha_x: u8,
    pub grid_alpha_y: u8,
    pub tick: Swatch,
    pub slice_border: Swatch,
    /// Slice colors, cycled when there are more entries than swatches.
    pub slice_cycle: Vec<Swatch>,

    pub line_width: f64,
    pub line_tension: f64,
    pub point_radius: f64,
    pub point_hover_radius: f64,
    pub point_border_width: f64,
    pub tooltip_border_width: f64,
    pub tooltip_corner_radius: f64,
    pub tick_font_size: f64,
    pub tick_font_weight: String,
    pub slice_border_width: f64,
    pub slice_hover_offset: f64,
    pub slice_hover_border_width: f64,
    pub doughnut_cutout: String,
    pub rotate_duration_ms: f64,
    pub rotate_easing: String,

    pub series_label: String,
    pub series_tooltip_name: String,
    pub value_prefix: String,
    pub value_suffix: String,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            line: Swatch::BlueAccent,
            line_fill_alpha: 0x15,
            point: Swatch::Charcoal,
            point_border: Swatch::PureWhite,
            point_hover: Swatch::BlueAccent,
            tooltip_background: Swatch::Charcoal,
            tooltip_text: Swatch::PureWhite,
            tooltip_border: Swatch::BlueAccent,
            grid: Swatch::MediumGray,
            grid_alpha_x: 0x20,
            grid_alpha_y: 0x15,
            tick: Swatch::DarkGray,
            slice_border: Swatch::PureWhite,
            slice_cycle: vec![
                Swatch::BlueAccent,
                Swatch::MediumGray,
                Swatch::MediumLightGray,
                Swatch::NearBlack,
            ],

            line_width: 2.0,
            line_tension: 0.4,
            point_radius: 5.0,
            point_hover_radius: 12.0,
            point_border_width: 3.0,
            tooltip_border_width: 2.0,
            tooltip_corner_radius: 8.0,
            tick_font_size: 12.0,
            tick_font_weight: "500".to_owned(),
            slice_border_width: 4.0,
            slice_hover_offset: 15.0,
            slice_hover_border_width: 6.0,
            doughnut_cutout: "65%".to_owned(),
            rotate_duration_ms: 2000.0,
            rotate_easing: "easeInOutCubic".to_owned(),

            series_label: "Market Size ($B)".to_owned(),
            series_tooltip_name: "Market Size".to_owned(),
            value_prefix: "$".to_owned(),
            value_suffix: "B".to_owned(),
        }
    }
}
