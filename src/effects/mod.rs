//! Cosmetic pointer and scroll effects.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::{ElementId, ElementSpec, Host, Rect};
use crate::scheduler::TimerQueue;

const RIPPLE_KEYFRAMES: &str = "\
@keyframes ripple {
  to { transform: scale(4); opacity: 0; }
}";

/// Circle geometry of one ripple, relative to its button.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RippleGeometry {
    pub size: f64,
    pub left: f64,
    pub top: f64,
}

/// Sizes the ripple to the button's larger side and centers it on the
/// pointer position (viewport coordinates).
#[must_use]
pub fn ripple_geometry(button: Rect, client_x: f64, client_y: f64) -> RippleGeometry {
    let size = button.width.max(button.height);
    RippleGeometry {
        size,
        left: client_x - button.left() - size / 2.0,
        top: client_y - button.top() - size / 2.0,
    }
}

/// Vertical parallax translation for a scroll offset.
#[must_use]
pub fn parallax_offset(scroll_y: f64, rate: f64) -> f64 {
    // `+ 0.0` folds a negative zero so an unscrolled page renders `translateY(0px)`.
    scroll_y * rate + 0.0
}

/// What a call-to-action button asks for, derived from its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CtaIntent {
    ScheduleReview,
    DownloadDeck,
}

impl CtaIntent {
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.contains("Schedule") {
            Some(Self::ScheduleReview)
        } else if label.contains("Download") {
            Some(Self::DownloadDeck)
        } else {
            None
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::ScheduleReview => {
                "Due diligence review scheduling will be available soon. Please contact our \
                 investment team directly for immediate scheduling."
            }
            Self::DownloadDeck => {
                "Full investment deck download will be available soon. Please contact our team \
                 for immediate access to the complete materials."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectsTask {
    RemoveRipple { button: ElementId, ripple: ElementId },
    CtaNotice(CtaIntent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub cta_selector: String,
    pub parallax_selector: String,
    pub hover_selector: String,
    pub parallax_rate: f64,
    pub ripple_duration_ms: f64,
    pub ripple_color: String,
    pub hover_transition: String,
    /// Delay between a CTA click and its notification.
    pub cta_notice_delay_ms: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            cta_selector: ".cta-buttons .btn".to_owned(),
            parallax_selector: ".hero-diagonal, .opportunity-diagonal, .strategy-diagonal"
                .to_owned(),
            hover_selector: ".metric-card, .fundamental-item, .pillar-card, .team-member, \
                             .highlight-item, .revenue-item"
                .to_owned(),
            parallax_rate: -0.3,
            ripple_duration_ms: 600.0,
            ripple_color: "rgba(255, 255, 255, 0.6)".to_owned(),
            hover_transition: "all 0.4s cubic-bezier(0.16, 1, 0.3, 1)".to_owned(),
            cta_notice_delay_ms: 200.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionEffects {
    config: EffectsConfig,
    cta_buttons: Vec<ElementId>,
    parallax: Vec<ElementId>,
    hover_cards: Vec<ElementId>,
    keyframes_injected: bool,
}

impl InteractionEffects {
    /// Collects parallax layers and hover cards. CTA buttons bind later,
    /// through `bind_cta_buttons`.
    pub fn bind<H: Host + ?Sized>(host: &H, config: EffectsConfig) -> Self {
        let parallax = host.query_all(&config.parallax_selector);
        let hover_cards = host.query_all(&config.hover_selector);
        Self {
            config,
            cta_buttons: Vec::new(),
            parallax,
            hover_cards,
            keyframes_injected: false,
        }
    }

    pub fn bind_cta_buttons<H: Host + ?Sized>(&mut self, host: &H) -> usize {
        self.cta_buttons = host.query_all(&self.config.cta_selector);
        debug!(count = self.cta_buttons.len(), "cta buttons bound");
        self.cta_buttons.len()
    }

    #[must_use]
    pub fn cta_buttons(&self) -> &[ElementId] {
        &self.cta_buttons
    }

    /// Handles a click on or inside a CTA button: spawns a ripple and queues
    /// the button's notice. Returns `true` when a CTA button was hit.
    pub fn on_click<H, T>(
        &mut self,
        host: &mut H,
        timers: &mut TimerQueue<T>,
        target: ElementId,
        client_x: f64,
        client_y: f64,
    ) -> bool
    where
        H: Host + ?Sized,
        T: From<EffectsTask>,
    {
        let Some(button) = self
            .cta_buttons
            .iter()
            .copied()
            .find(|button| host.contains(*button, target))
        else {
            return false;
        };

        self.spawn_ripple(host, timers, button, client_x, client_y);
        if let Some(intent) = CtaIntent::from_label(&host.text_content(button)) {
            timers.schedule(
                self.config.cta_notice_delay_ms,
                T::from(EffectsTask::CtaNotice(intent)),
            );
        }
        true
    }

    /// Appends a ripple overlay to `button` and schedules its removal.
    pub fn spawn_ripple<H, T>(
        &mut self,
        host: &mut H,
        timers: &mut TimerQueue<T>,
        button: ElementId,
        client_x: f64,
        client_y: f64,
    ) -> Option<ElementId>
    where
        H: Host + ?Sized,
        T: From<EffectsTask>,
    {
        let Some(rect) = host.bounding_rect(button) else {
            debug!(?button, "ripple skipped: button has no layout");
            return None;
        };
        if !self.keyframes_injected {
            self.keyframes_injected = host.inject_stylesheet(RIPPLE_KEYFRAMES).is_some();
        }

        let geometry = ripple_geometry(rect, client_x, client_y);
        let spec = ElementSpec::new("span")
            .with_class("ripple")
            .with_style("position", "absolute")
            .with_style("border-radius", "50%")
            .with_style("transform", "scale(0)")
            .with_style(
                "animation",
                format!("ripple {}s linear", self.config.ripple_duration_ms / 1000.0),
            )
            .with_style("background-color", self.config.ripple_color.clone())
            .with_style("width", format!("{}px", geometry.size))
            .with_style("height", format!("{}px", geometry.size))
            .with_style("left", format!("{}px", geometry.left))
            .with_style("top", format!("{}px", geometry.top));

        host.set_style(button, "position", "relative");
        host.set_style(button, "overflow", "hidden");
        let ripple = host.create_element(button, &spec)?;
        timers.schedule(
            self.config.ripple_duration_ms,
            T::from(EffectsTask::RemoveRipple { button, ripple }),
        );
        Some(ripple)
    }

    /// Removes a finished ripple if it is still inside its button.
    pub fn remove_ripple<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        button: ElementId,
        ripple: ElementId,
    ) -> bool {
        if ripple == button || !host.contains(button, ripple) {
            return false;
        }
        host.remove_element(ripple)
    }

    pub fn apply_parallax<H: Host + ?Sized>(&self, host: &mut H, scroll_y: f64) {
        let offset = parallax_offset(scroll_y, self.config.parallax_rate);
        let transform = format!("translateY({offset}px)");
        for element in &self.parallax {
            host.set_style(*element, "transform", &transform);
        }
    }

    /// Pointer enter/leave on a card sets its hover transition.
    pub fn on_hover<H: Host + ?Sized>(&self, host: &mut H, target: ElementId) -> bool {
        let Some(card) = self
            .hover_cards
            .iter()
            .copied()
            .find(|card| host.contains(*card, target))
        else {
            return false;
        };
        host.set_style(card, "transition", &self.config.hover_transition);
        true
    }
}
