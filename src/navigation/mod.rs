//! Anchor navigation and the scroll-spy "active" marker.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::{ElementId, Host, ScrollBehavior};
use crate::scheduler::{TimerHandle, TimerQueue};
use crate::visibility::{
    ObserveMode, ObserverConfig, ObserverId, RootMargin, VisibilityCoordinator, VisibilityNotice,
};

/// Inline styles of the fixed navigation bar in one scroll state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavBarStyle {
    pub background: String,
    pub box_shadow: String,
    pub backdrop_filter: String,
}

impl NavBarStyle {
    fn apply<H: Host + ?Sized>(&self, host: &mut H, nav_bar: ElementId) {
        host.set_style(nav_bar, "background", &self.background);
        host.set_style(nav_bar, "box-shadow", &self.box_shadow);
        host.set_style(nav_bar, "backdrop-filter", &self.backdrop_filter);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub link_selector: String,
    pub section_selector: String,
    pub nav_bar_selector: String,
    pub active_class: String,
    /// Distance kept between the viewport top and a scrolled-to section.
    pub scroll_offset_px: f64,
    pub spy_observer: ObserverConfig,
    /// Scroll offset above which the nav bar switches to its elevated look.
    pub elevation_threshold_px: f64,
    pub scroll_debounce_ms: f64,
    pub elevated: NavBarStyle,
    pub resting: NavBarStyle,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        let spy_margin = "-80px 0px -50% 0px"
            .parse::<RootMargin>()
            .unwrap_or_default();
        Self {
            link_selector: ".nav-link".to_owned(),
            section_selector: "section[id]".to_owned(),
            nav_bar_selector: ".nav-bar".to_owned(),
            active_class: "active".to_owned(),
            scroll_offset_px: 80.0,
            spy_observer: ObserverConfig::new(0.3).with_root_margin(spy_margin),
            elevation_threshold_px: 100.0,
            scroll_debounce_ms: 10.0,
            elevated: NavBarStyle {
                background: "rgba(255, 255, 255, 0.98)".to_owned(),
                box_shadow: "0 4px 20px rgba(52, 58, 64, 0.1)".to_owned(),
                backdrop_filter: "blur(25px)".to_owned(),
            },
            resting: NavBarStyle {
                background: "rgba(255, 255, 255, 0.95)".to_owned(),
                box_shadow: "none".to_owned(),
                backdrop_filter: "blur(20px)".to_owned(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub element: ElementId,
    /// Section id the link points to, without the leading `#`.
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTask {
    ScrollSettled,
}

#[derive(Debug, Clone)]
pub struct NavigationSync {
    config: NavigationConfig,
    links: Vec<NavLink>,
    sections: IndexMap<String, ElementId>,
    nav_bar: Option<ElementId>,
    active: Option<String>,
    spy_observer: ObserverId,
    pending_scroll: Option<TimerHandle>,
    elevated: Option<bool>,
}

impl NavigationSync {
    /// Collects links and sections and registers sections with a scroll-spy
    /// observer.
    pub fn bind<H: Host + ?Sized>(
        host: &H,
        visibility: &mut VisibilityCoordinator,
        config: NavigationConfig,
    ) -> Self {
        let links: Vec<NavLink> = host
            .query_all(&config.link_selector)
            .into_iter()
            .filter_map(|element| {
                let href = host.attribute(element, "href")?;
                let target = href.strip_prefix('#')?;
                (!target.is_empty()).then(|| NavLink {
                    element,
                    target: target.to_owned(),
                })
            })
            .collect();

        let spy_observer = visibility.create_observer(config.spy_observer, ObserveMode::Continuous);
        let mut sections = IndexMap::new();
        for element in host.query_all(&config.section_selector) {
            if let Some(id) = host.attribute(element, "id") {
                visibility.observe(spy_observer, element);
                sections.insert(id, element);
            }
        }

        let nav_bar = host.query(&config.nav_bar_selector);
        debug!(
            links = links.len(),
            sections = sections.len(),
            has_nav_bar = nav_bar.is_some(),
            "navigation bound"
        );

        Self {
            config,
            links,
            sections,
            nav_bar,
            active: None,
            spy_observer,
            pending_scroll: None,
            elevated: None,
        }
    }

    #[must_use]
    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    #[must_use]
    pub fn active_section(&self) -> Option<&str> {
        self.active.as_deref()
    }

    #[must_use]
    pub fn spy_observer(&self) -> ObserverId {
        self.spy_observer
    }

    /// Nav link containing `target`, if any.
    #[must_use]
    pub fn link_for<H: Host + ?Sized>(&self, host: &H, target: ElementId) -> Option<&NavLink> {
        self.links
            .iter()
            .find(|link| host.contains(link.element, target))
    }

    /// Handles a click anywhere in the document. Returns `true` when the
    /// click hit a nav link and default navigation must be suppressed.
    pub fn on_click<H: Host + ?Sized>(&mut self, host: &mut H, target: ElementId) -> bool {
        let Some(section_id) = self
            .link_for(&*host, target)
            .map(|link| link.target.clone())
        else {
            return false;
        };
        self.navigate_to(host, &section_id);
        true
    }

    /// Smooth-scrolls to `section_id` and marks it active right away,
    /// without waiting for the scroll to finish. Unknown sections are
    /// ignored.
    pub fn navigate_to<H: Host + ?Sized>(&mut self, host: &mut H, section_id: &str) -> bool {
        let Some(section) = self.sections.get(section_id).copied() else {
            debug!(section_id, "navigation target not found");
            return false;
        };
        let Some(offset_top) = host.offset_top(section) else {
            debug!(section_id, "navigation target has no layout");
            return false;
        };
        host.scroll_to(offset_top - self.config.scroll_offset_px, ScrollBehavior::Smooth);
        self.set_active(host, section_id);
        true
    }

    /// Applies a scroll-spy notice. Later notices win.
    pub fn on_visibility<H: Host + ?Sized>(&mut self, host: &mut H, notice: VisibilityNotice) -> bool {
        if notice.observer != self.spy_observer {
            return false;
        }
        let Some(section_id) = self
            .sections
            .iter()
            .find(|(_, element)| **element == notice.element)
            .map(|(id, _)| id.clone())
        else {
            return false;
        };
        self.set_active(host, &section_id);
        true
    }

    /// Moves the active marker so only links targeting `section_id` carry it.
    pub fn set_active<H: Host + ?Sized>(&mut self, host: &mut H, section_id: &str) {
        for link in &self.links {
            host.remove_class(link.element, &self.config.active_class);
            if link.target == section_id {
                host.add_class(link.element, &self.config.active_class);
            }
        }
        self.active = Some(section_id.to_owned());
    }

    /// Debounces scroll events: re-arms the settle timer on every call.
    pub fn on_scroll<T: From<NavigationTask>>(&mut self, timers: &mut TimerQueue<T>) {
        if let Some(pending) = self.pending_scroll.take() {
            timers.cancel(pending);
        }
        let handle = timers.schedule(
            self.config.scroll_debounce_ms,
            T::from(NavigationTask::ScrollSettled),
        );
        self.pending_scroll = Some(handle);
    }

    /// Updates the nav bar look once scrolling has settled.
    pub fn on_scroll_settled<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.pending_scroll = None;
        let Some(nav_bar) = self.nav_bar.filter(|nav_bar| host.is_connected(*nav_bar)) else {
            return;
        };
        let elevated = host.viewport().scroll_y > self.config.elevation_threshold_px;
        if self.elevated == Some(elevated) {
            return;
        }
        let style = if elevated {
            &self.config.elevated
        } else {
            &self.config.resting
        };
        style.apply(host, nav_bar);
        self.elevated = Some(elevated);
    }

    #[must_use]
    pub fn is_elevated(&self) -> bool {
        self.elevated == Some(true)
    }
}
