use serde::{Deserialize, Serialize};

use super::{DelayPolicy, RevealEffect};
use crate::visibility::{ObserverConfig, RootMargin};

pub type StyleDecl = (String, String);

fn decl(property: &str, value: &str) -> StyleDecl {
    (property.to_owned(), value.to_owned())
}

const CARD_TRANSITION: &str = "all 0.6s cubic-bezier(0.16, 1, 0.3, 1)";

/// A family of elements revealed with a shared stagger once they scroll
/// into view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaggerGroup {
    pub selector: String,
    pub observer: ObserverConfig,
    pub policy: DelayPolicy,
    pub effect: RevealEffect,
    /// Styles applied at boot, before anything is visible.
    #[serde(default)]
    pub initial_styles: Vec<StyleDecl>,
}

/// Cards revealed on page load rather than on visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntranceSequence {
    pub selector: String,
    pub start_delay_ms: f64,
    pub policy: DelayPolicy,
    pub initial_styles: Vec<StyleDecl>,
    pub effect: RevealEffect,
}

impl Default for EntranceSequence {
    fn default() -> Self {
        Self {
            selector: ".metric-card".to_owned(),
            start_delay_ms: 1000.0,
            policy: DelayPolicy::linear(150.0),
            initial_styles: vec![
                decl("opacity", "0"),
                decl("transform", "translateY(30px) scale(0.9)"),
            ],
            effect: RevealEffect::Styles(vec![
                decl("transition", CARD_TRANSITION),
                decl("opacity", "1"),
                decl("transform", "translateY(0) scale(1)"),
            ]),
        }
    }
}

fn section_item_observer() -> ObserverConfig {
    let margin = "0px 0px -50px 0px"
        .parse::<RootMargin>()
        .unwrap_or_default();
    ObserverConfig::new(0.2).with_root_margin(margin)
}

fn hidden_card_styles() -> Vec<StyleDecl> {
    vec![
        decl("opacity", "0"),
        decl("transform", "translateY(20px) scale(0.95)"),
        decl("transition", CARD_TRANSITION),
    ]
}

/// Reveal groups of the investor page.
#[must_use]
pub fn default_stagger_groups() -> Vec<StaggerGroup> {
    vec![
        StaggerGroup {
            selector: ".fundamental-item".to_owned(),
            observer: section_item_observer(),
            policy: DelayPolicy::attribute("data-index", 150.0),
            effect: RevealEffect::class("animate"),
            initial_styles: Vec::new(),
        },
        StaggerGroup {
            selector: ".highlight-item".to_owned(),
            observer: section_item_observer(),
            policy: DelayPolicy::attribute("data-index", 100.0),
            effect: RevealEffect::class("animate"),
            initial_styles: Vec::new(),
        },
        StaggerGroup {
            selector: ".pillar-card".to_owned(),
            observer: section_item_observer(),
            policy: DelayPolicy::linear(200.0),
            effect: RevealEffect::Styles(vec![
                decl("opacity", "1"),
                decl("transform", "translateY(0)"),
            ]),
            initial_styles: hidden_card_styles(),
        },
        StaggerGroup {
            selector: ".team-member".to_owned(),
            observer: section_item_observer(),
            policy: DelayPolicy::linear(150.0),
            effect: RevealEffect::Styles(vec![
                decl("opacity", "1"),
                decl("transform", "translateY(0) scale(1)"),
            ]),
            initial_styles: hidden_card_styles(),
        },
        StaggerGroup {
            selector: ".financial-table tbody tr".to_owned(),
            observer: ObserverConfig::new(0.5),
            policy: DelayPolicy::attribute("data-year", 200.0),
            effect: RevealEffect::class("animate"),
            initial_styles: Vec::new(),
        },
    ]
}
