use serde::{Deserialize, Serialize};

use crate::animation::{EntranceSequence, StaggerGroup, default_stagger_groups};
use crate::chart::ChartTheme;
use crate::effects::EffectsConfig;
use crate::error::{PageError, PageResult};
use crate::navigation::NavigationConfig;
use crate::notification::NotifierConfig;
use crate::visibility::ObserverConfig;

/// Boot timing and per-component configuration of one page.
///
/// Delays are in milliseconds. Navigation binds at `start`; the chart layer
/// initializes after `chart_init_delay_ms` and renders `chart_render_delay_ms`
/// later; the animation, interaction and lazy-load layers initialize after
/// `interaction_init_delay_ms`, and CTA buttons bind `cta_bind_delay_ms`
/// after that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub chart_init_delay_ms: f64,
    pub chart_render_delay_ms: f64,
    pub interaction_init_delay_ms: f64,
    pub cta_bind_delay_ms: f64,
    pub loaded_class: String,
    pub lazy_chart_selector: String,
    pub lazy_chart_observer: ObserverConfig,
    pub navigation: NavigationConfig,
    pub effects: EffectsConfig,
    pub notifier: NotifierConfig,
    pub chart_theme: ChartTheme,
    pub stagger_groups: Vec<StaggerGroup>,
    pub entrance: EntranceSequence,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            chart_init_delay_ms: 300.0,
            chart_render_delay_ms: 500.0,
            interaction_init_delay_ms: 600.0,
            cta_bind_delay_ms: 500.0,
            loaded_class: "loaded".to_owned(),
            lazy_chart_selector: ".chart-container".to_owned(),
            lazy_chart_observer: ObserverConfig::new(0.1),
            navigation: NavigationConfig::default(),
            effects: EffectsConfig::default(),
            notifier: NotifierConfig::default(),
            chart_theme: ChartTheme::default(),
            stagger_groups: default_stagger_groups(),
            entrance: EntranceSequence::default(),
        }
    }
}

impl PageConfig {
    pub fn from_json_str(input: &str) -> PageResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            PageError::InvalidContent(format!("failed to parse page config json payload: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PageResult<()> {
        for (name, value) in [
            ("chart_init_delay_ms", self.chart_init_delay_ms),
            ("chart_render_delay_ms", self.chart_render_delay_ms),
            ("interaction_init_delay_ms", self.interaction_init_delay_ms),
            ("cta_bind_delay_ms", self.cta_bind_delay_ms),
            ("entrance.start_delay_ms", self.entrance.start_delay_ms),
            ("notifier.auto_dismiss_ms", self.notifier.auto_dismiss_ms),
            ("notifier.close_transition_ms", self.notifier.close_transition_ms),
            ("navigation.scroll_debounce_ms", self.navigation.scroll_debounce_ms),
            ("effects.ripple_duration_ms", self.effects.ripple_duration_ms),
            ("effects.cta_notice_delay_ms", self.effects.cta_notice_delay_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PageError::InvalidContent(format!(
                    "config `{name}` must be finite and >= 0"
                )));
            }
        }

        self.lazy_chart_observer.validate()?;
        self.navigation.spy_observer.validate()?;
        for group in &self.stagger_groups {
            group.observer.validate()?;
        }
        if self.chart_theme.slice_cycle.is_empty() {
            return Err(PageError::InvalidContent(
                "chart theme slice cycle must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}
