use serde::{Deserialize, Serialize};

use crate::core::Color;
use crate::error::{PageError, PageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Doughnut,
}

/// One color for the whole dataset or one per data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Single(Color),
    PerPoint(Vec<Color>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_border_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_border_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_border_width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOptions {
    pub intersect: bool,
    pub mode: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendOptions {
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    pub background_color: Color,
    pub title_color: Color,
    pub body_color: Color,
    pub border_color: Color,
    pub border_width: f64,
    pub corner_radius: f64,
    pub display_colors: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    pub legend: LegendOptions,
    pub tooltip: TooltipOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    pub color: Color,
    pub draw_border: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontOptions {
    pub size: f64,
    pub weight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOptions {
    pub color: Color,
    pub font: FontOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisOptions {
    pub grid: GridOptions,
    pub ticks: TickOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scales {
    pub x: AxisOptions,
    pub y: AxisOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationOptions {
    pub animate_rotate: bool,
    pub duration: f64,
    pub easing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionOptions>,
    pub plugins: PluginOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationOptions>,
}

/// Prefix/suffix wrapped around axis tick values, e.g. `$` and `B`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueAffixes {
    pub prefix: String,
    pub suffix: String,
}

impl ValueAffixes {
    #[must_use]
    pub fn format(&self, value: impl std::fmt::Display) -> String {
        format!("{}{value}{}", self.prefix, self.suffix)
    }
}

/// Configuration object handed to the chart renderer.
///
/// Serializes to the renderer's JSON option layout. Tooltip texts and the
/// tick format cannot be expressed as data there, so they travel alongside
/// and are installed as callbacks by renderers that support them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
    #[serde(skip)]
    pub tooltip_labels: Vec<String>,
    #[serde(skip)]
    pub tick_affixes: Option<ValueAffixes>,
}

impl ChartSpec {
    /// Tooltip text for the data point at `index`.
    #[must_use]
    pub fn tooltip_label(&self, index: usize) -> Option<&str> {
        self.tooltip_labels.get(index).map(String::as_str)
    }

    /// Y-axis tick text for `value`, when the chart formats ticks.
    #[must_use]
    pub fn format_tick(&self, value: f64) -> Option<String> {
        self.tick_affixes.as_ref().map(|affixes| affixes.format(value))
    }

    pub fn validate(&self) -> PageResult<()> {
        if self.data.datasets.is_empty() {
            return Err(PageError::InvalidContent(
                "chart must have at least one dataset".to_owned(),
            ));
        }
        for dataset in &self.data.datasets {
            if dataset.data.len() != self.data.labels.len() {
                return Err(PageError::InvalidContent(format!(
                    "dataset has {} values for {} labels",
                    dataset.data.len(),
                    self.data.labels.len()
                )));
            }
            if dataset.data.iter().any(|value| !value.is_finite()) {
                return Err(PageError::InvalidContent(
                    "chart values must be finite".to_owned(),
                ));
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> PageResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            PageError::InvalidContent(format!("failed to serialize chart config: {e}"))
        })
    }

    pub fn to_json_value(&self) -> PageResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| {
            PageError::InvalidContent(format!("failed to serialize chart config: {e}"))
        })
    }
}
