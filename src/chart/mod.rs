//! Chart configuration and the renderer seam.
//!
//! The adapters turn content into `ChartSpec`s; a `ChartRenderer` backend
//! turns specs into pixels. Backends receive fully materialized specs so the
//! drawing library stays isolated from page logic.

mod adapter;
mod spec;
mod theme;

pub use adapter::{proportion_chart, time_series_chart};
pub use spec::{
    AnimationOptions, AxisOptions, ChartData, ChartKind, ChartOptions, ChartSpec, ColorValue,
    Dataset, FontOptions, GridOptions, InteractionOptions, LegendOptions, PluginOptions, Scales,
    TickOptions, TooltipOptions, ValueAffixes,
};
pub use theme::ChartTheme;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PageError, PageResult};
use crate::host::{ElementId, Host};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartHandle(pub u64);

/// Contract implemented by any chart drawing backend.
pub trait ChartRenderer {
    fn render(&mut self, canvas: ElementId, spec: &ChartSpec) -> PageResult<ChartHandle>;

    fn destroy(&mut self, handle: ChartHandle);
}

/// Recording renderer used by tests and headless runs.
///
/// It still validates specs so tests catch malformed configurations.
#[derive(Debug, Default)]
pub struct NullChartRenderer {
    pub rendered: Vec<(ElementId, ChartSpec)>,
    pub destroyed: Vec<ChartHandle>,
    /// When set, every `render` fails with `RendererUnavailable`.
    pub unavailable: Option<String>,
    next_handle: u64,
}

impl NullChartRenderer {
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.rendered.len().saturating_sub(self.destroyed.len())
    }
}

impl ChartRenderer for NullChartRenderer {
    fn render(&mut self, canvas: ElementId, spec: &ChartSpec) -> PageResult<ChartHandle> {
        if let Some(reason) = &self.unavailable {
            return Err(PageError::RendererUnavailable(reason.clone()));
        }
        spec.validate()?;
        self.rendered.push((canvas, spec.clone()));
        let handle = ChartHandle(self.next_handle);
        self.next_handle += 1;
        Ok(handle)
    }

    fn destroy(&mut self, handle: ChartHandle) {
        self.destroyed.push(handle);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChartSlot {
    MarketGrowth,
    Revenue,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 2] = [ChartSlot::MarketGrowth, ChartSlot::Revenue];

    #[must_use]
    pub fn canvas_selector(self) -> &'static str {
        match self {
            Self::MarketGrowth => "#marketGrowthChart",
            Self::Revenue => "#revenueChart",
        }
    }
}

/// Live charts owned by one page.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: IndexMap<ChartSlot, ChartHandle>,
}

impl ChartRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `spec` into the slot's canvas, replacing any chart already in
    /// the slot.
    pub fn mount<H, R>(
        &mut self,
        host: &H,
        renderer: &mut R,
        slot: ChartSlot,
        spec: &ChartSpec,
    ) -> PageResult<ChartHandle>
    where
        H: Host + ?Sized,
        R: ChartRenderer + ?Sized,
    {
        let canvas = host
            .query(slot.canvas_selector())
            .ok_or_else(|| PageError::missing(slot.canvas_selector()))?;
        if let Some(previous) = self.charts.shift_remove(&slot) {
            renderer.destroy(previous);
        }
        let handle = renderer.render(canvas, spec)?;
        self.charts.insert(slot, handle);
        debug!(?slot, ?handle, "chart mounted");
        Ok(handle)
    }

    /// Like `mount`, but absorbs failures: the chart is skipped and the
    /// reason logged.
    pub fn mount_or_skip<H, R>(
        &mut self,
        host: &H,
        renderer: &mut R,
        slot: ChartSlot,
        spec: PageResult<ChartSpec>,
    ) -> Option<ChartHandle>
    where
        H: Host + ?Sized,
        R: ChartRenderer + ?Sized,
    {
        let result = spec.and_then(|spec| self.mount(host, renderer, slot, &spec));
        match result {
            Ok(handle) => Some(handle),
            Err(error) => {
                warn!(?slot, %error, "chart skipped");
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, slot: ChartSlot) -> Option<ChartHandle> {
        self.charts.get(&slot).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.charts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn destroy_all<R: ChartRenderer + ?Sized>(&mut self, renderer: &mut R) {
        for (_, handle) in self.charts.drain(..) {
            renderer.destroy(handle);
        }
    }
}
