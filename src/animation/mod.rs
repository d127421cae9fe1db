//! Staggered reveal scheduling.

mod delay;
mod groups;

pub use delay::{DelayPolicy, parse_leading_int};
pub use groups::{EntranceSequence, StaggerGroup, StyleDecl, default_stagger_groups};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::{ElementId, Host};
use crate::scheduler::{TimerHandle, TimerQueue};

/// Terminal visual state applied when a reveal fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealEffect {
    AddClass(String),
    Styles(Vec<StyleDecl>),
}

impl RevealEffect {
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::AddClass(class.into())
    }

    pub fn apply<H: Host + ?Sized>(&self, host: &mut H, element: ElementId) {
        match self {
            Self::AddClass(class) => host.add_class(element, class),
            Self::Styles(styles) => {
                for (property, value) in styles {
                    host.set_style(element, property, value);
                }
            }
        }
    }
}

/// Timer payload for one pending reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealTask {
    pub element: ElementId,
    pub effect: RevealEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackedState {
    Scheduled,
    Animated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedElement {
    pub element: ElementId,
    /// Delay the element was scheduled with, in milliseconds.
    pub delay_ms: f64,
    pub state: TrackedState,
}

/// Schedules reveals and enforces that each element animates at most once.
#[derive(Debug, Clone, Default)]
pub struct SequencedAnimator {
    tracked: IndexMap<ElementId, TrackedElement>,
}

impl SequencedAnimator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules one reveal per `(element, index)` pair.
    ///
    /// Delays are measured from the queue's current clock. Elements already
    /// scheduled or animated are skipped, so repeated calls never re-trigger
    /// a transition.
    pub fn schedule<H, T>(
        &mut self,
        host: &H,
        timers: &mut TimerQueue<T>,
        elements: &[(ElementId, usize)],
        policy: &DelayPolicy,
        effect: &RevealEffect,
    ) -> Vec<TimerHandle>
    where
        H: Host + ?Sized,
        T: From<RevealTask>,
    {
        let mut handles = Vec::with_capacity(elements.len());
        for &(element, index) in elements {
            if self.tracked.contains_key(&element) {
                continue;
            }
            let delay_ms = policy.delay_ms(host, element, index);
            let task = RevealTask {
                element,
                effect: effect.clone(),
            };
            handles.push(timers.schedule(delay_ms, T::from(task)));
            self.tracked.insert(
                element,
                TrackedElement {
                    element,
                    delay_ms,
                    state: TrackedState::Scheduled,
                },
            );
        }
        handles
    }

    /// Applies a fired reveal. Returns `false` when the element is gone or
    /// was already animated.
    pub fn reveal<H: Host + ?Sized>(&mut self, host: &mut H, task: &RevealTask) -> bool {
        if !host.is_connected(task.element) {
            debug!(element = ?task.element, "reveal skipped for detached element");
            return false;
        }
        let entry = self.tracked.entry(task.element).or_insert(TrackedElement {
            element: task.element,
            delay_ms: 0.0,
            state: TrackedState::Scheduled,
        });
        if entry.state == TrackedState::Animated {
            return false;
        }
        task.effect.apply(host, task.element);
        entry.state = TrackedState::Animated;
        true
    }

    #[must_use]
    pub fn tracked(&self, element: ElementId) -> Option<TrackedElement> {
        self.tracked.get(&element).copied()
    }

    #[must_use]
    pub fn animated_count(&self) -> usize {
        self.tracked
            .values()
            .filter(|tracked| tracked.state == TrackedState::Animated)
            .count()
    }

    pub fn clear(&mut self) {
        self.tracked.clear();
    }
}

/// Applies a list of inline styles to every element.
pub fn apply_styles<H: Host + ?Sized>(host: &mut H, elements: &[ElementId], styles: &[StyleDecl]) {
    for element in elements {
        for (property, value) in styles {
            host.set_style(*element, property, value);
        }
    }
}
