//! Page controller: boots every layer on a timer schedule and routes host
//! events to them.

mod config;

pub use config::PageConfig;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::animation::{RevealTask, SequencedAnimator, StaggerGroup, apply_styles};
use crate::chart::{
    ChartRegistry, ChartRenderer, ChartSlot, proportion_chart, time_series_chart,
};
use crate::core::ContentModel;
use crate::effects::{EffectsTask, InteractionEffects};
use crate::error::PageResult;
use crate::host::{ElementId, Host};
use crate::navigation::{NavigationSync, NavigationTask};
use crate::notification::{ModalNotifier, NotificationId, NotificationKind, NotifierTask};
use crate::scheduler::TimerQueue;
use crate::visibility::{ObserveMode, ObserverId, VisibilityCoordinator, VisibilityNotice};

/// Disables transitions and animations when the user asks for reduced
/// motion.
pub const REDUCED_MOTION_CSS: &str = "\
*, *::before, *::after {
  animation-duration: 0.01ms !important;
  animation-iteration-count: 1 !important;
  transition-duration: 0.01ms !important;
  scroll-behavior: auto !important;
}";

/// Host events the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PageEvent {
    /// Pointer click. Coordinates are viewport-relative.
    Click {
        target: ElementId,
        client_x: f64,
        client_y: f64,
    },
    Scroll,
    Resize,
    PointerEnter { target: ElementId },
    PointerLeave { target: ElementId },
    /// Window load completed.
    Load,
}

/// Deferred work owned by the page timer queue.
#[derive(Debug, Clone, PartialEq)]
pub enum PageTask {
    InitCharts,
    RenderCharts,
    InitInteractions,
    BindCtaButtons,
    StartEntrance,
    Reveal(RevealTask),
    Navigation(NavigationTask),
    Notifier(NotifierTask),
    Effects(EffectsTask),
}

impl From<RevealTask> for PageTask {
    fn from(task: RevealTask) -> Self {
        Self::Reveal(task)
    }
}

impl From<NavigationTask> for PageTask {
    fn from(task: NavigationTask) -> Self {
        Self::Navigation(task)
    }
}

impl From<NotifierTask> for PageTask {
    fn from(task: NotifierTask) -> Self {
        Self::Notifier(task)
    }
}

impl From<EffectsTask> for PageTask {
    fn from(task: EffectsTask) -> Self {
        Self::Effects(task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PagePhase {
    Created,
    Running,
    ShutDown,
}

/// A stagger group bound to its observer and members.
#[derive(Debug, Clone)]
struct BoundGroup {
    group: usize,
    observer: ObserverId,
    members: Vec<ElementId>,
}

/// Owns the host, the chart renderer and every page layer.
///
/// Time only moves through [`PageController::advance_to`]; the controller
/// never reads a clock itself, so any run can be replayed exactly.
pub struct PageController<H: Host, R: ChartRenderer> {
    host: H,
    renderer: R,
    content: ContentModel,
    config: PageConfig,
    phase: PagePhase,
    timers: TimerQueue<PageTask>,
    visibility: VisibilityCoordinator,
    animator: SequencedAnimator,
    groups: Vec<BoundGroup>,
    lazy_observer: Option<ObserverId>,
    navigation: Option<NavigationSync>,
    effects: Option<InteractionEffects>,
    notifier: ModalNotifier,
    charts: ChartRegistry,
    charts_initialized: bool,
}

impl<H: Host, R: ChartRenderer> PageController<H, R> {
    /// Validates content and configuration. Nothing touches the host until
    /// [`PageController::start`].
    pub fn new(host: H, renderer: R, content: ContentModel, config: PageConfig) -> PageResult<Self> {
        content.validate()?;
        config.validate()?;
        let notifier = ModalNotifier::new(config.notifier, content.palette);
        Ok(Self {
            host,
            renderer,
            content,
            config,
            phase: PagePhase::Created,
            timers: TimerQueue::new(),
            visibility: VisibilityCoordinator::new(),
            animator: SequencedAnimator::new(),
            groups: Vec::new(),
            lazy_observer: None,
            navigation: None,
            effects: None,
            notifier,
            charts: ChartRegistry::new(),
            charts_initialized: false,
        })
    }

    /// Runs the document-ready step at `now_ms`: binds navigation, applies
    /// the hidden start styles and arms the chart and interaction timers.
    /// Calling it again is a no-op.
    pub fn start(&mut self, now_ms: f64) {
        if self.phase != PagePhase::Created {
            debug!(phase = ?self.phase, "start ignored");
            return;
        }
        self.phase = PagePhase::Running;
        self.timers.advance_clock(now_ms);
        info!(now_ms, "page starting");

        for group in &self.config.stagger_groups {
            if group.initial_styles.is_empty() {
                continue;
            }
            let members = self.host.query_all(&group.selector);
            apply_styles(&mut self.host, &members, &group.initial_styles);
        }

        self.navigation = Some(NavigationSync::bind(
            &self.host,
            &mut self.visibility,
            self.config.navigation.clone(),
        ));
        self.timers
            .schedule(self.config.chart_init_delay_ms, PageTask::InitCharts);
        self.timers
            .schedule(self.config.interaction_init_delay_ms, PageTask::InitInteractions);
        self.refresh_visibility();
    }

    /// Moves the clock to `now_ms`, running every timer due by then in
    /// deadline order. Returns the number of tasks run.
    pub fn advance_to(&mut self, now_ms: f64) -> usize {
        let mut fired = 0;
        while let Some(task) = self.timers.pop_due(now_ms) {
            self.run_task(task);
            fired += 1;
        }
        self.timers.advance_clock(now_ms);
        fired
    }

    /// Routes one host event that arrived at `now_ms`. Returns `true` when
    /// the host must suppress the event's default action.
    ///
    /// Timers due by `now_ms` run first, so delays scheduled by the event
    /// start at the event time rather than at the last `advance_to`.
    pub fn dispatch(&mut self, now_ms: f64, event: PageEvent) -> bool {
        if self.phase != PagePhase::Running {
            debug!(?event, phase = ?self.phase, "event ignored");
            return false;
        }
        self.advance_to(now_ms);
        match event {
            PageEvent::Click {
                target,
                client_x,
                client_y,
            } => self.on_click(target, client_x, client_y),
            PageEvent::Scroll => {
                if let Some(navigation) = &mut self.navigation {
                    navigation.on_scroll(&mut self.timers);
                }
                if let Some(effects) = &self.effects {
                    let scroll_y = self.host.viewport().scroll_y;
                    effects.apply_parallax(&mut self.host, scroll_y);
                }
                self.refresh_visibility();
                false
            }
            PageEvent::Resize => {
                self.refresh_visibility();
                false
            }
            PageEvent::PointerEnter { target } | PageEvent::PointerLeave { target } => {
                if let Some(effects) = &self.effects {
                    effects.on_hover(&mut self.host, target);
                }
                false
            }
            PageEvent::Load => {
                if let Some(body) = self.host.body() {
                    self.host.add_class(body, &self.config.loaded_class);
                }
                self.refresh_visibility();
                false
            }
        }
    }

    /// Shows a notification at `now_ms`, replacing any open one. The
    /// auto-dismiss delay counts from `now_ms`.
    pub fn notify(
        &mut self,
        now_ms: f64,
        message: &str,
        kind: NotificationKind,
    ) -> Option<NotificationId> {
        if self.phase == PagePhase::ShutDown {
            return None;
        }
        self.advance_to(now_ms);
        self.notifier
            .notify(&mut self.host, &mut self.timers, message, kind)
    }

    /// Cancels timers, disconnects observers, destroys charts and removes
    /// any notification. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.phase == PagePhase::ShutDown {
            return;
        }
        self.phase = PagePhase::ShutDown;
        self.timers.clear();
        self.visibility.disconnect_all();
        self.charts.destroy_all(&mut self.renderer);
        self.notifier.dismiss_now(&mut self.host);
        self.groups.clear();
        self.lazy_observer = None;
        info!("page shut down");
    }

    /// Samples every observer against the current viewport and applies the
    /// resulting notices.
    pub fn refresh_visibility(&mut self) -> usize {
        if self.phase != PagePhase::Running {
            return 0;
        }
        let notices = self.visibility.evaluate(&self.host);
        let count = notices.len();
        for notice in notices {
            self.on_visibility(notice);
        }
        count
    }

    #[must_use]
    pub fn phase(&self) -> PagePhase {
        self.phase
    }

    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.timers.now_ms()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, for layout and scroll changes between events.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn content(&self) -> &ContentModel {
        &self.content
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn timers(&self) -> &TimerQueue<PageTask> {
        &self.timers
    }

    #[must_use]
    pub fn visibility(&self) -> &VisibilityCoordinator {
        &self.visibility
    }

    #[must_use]
    pub fn navigation(&self) -> Option<&NavigationSync> {
        self.navigation.as_ref()
    }

    #[must_use]
    pub fn effects(&self) -> Option<&InteractionEffects> {
        self.effects.as_ref()
    }

    #[must_use]
    pub fn notifier(&self) -> &ModalNotifier {
        &self.notifier
    }

    #[must_use]
    pub fn animator(&self) -> &SequencedAnimator {
        &self.animator
    }

    #[must_use]
    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn into_parts(self) -> (H, R) {
        (self.host, self.renderer)
    }

    fn on_click(&mut self, target: ElementId, client_x: f64, client_y: f64) -> bool {
        if self
            .notifier
            .handle_click(&mut self.host, &mut self.timers, target)
        {
            return false;
        }
        if let Some(navigation) = &mut self.navigation {
            if navigation.on_click(&mut self.host, target) {
                return true;
            }
        }
        if let Some(effects) = &mut self.effects {
            effects.on_click(&mut self.host, &mut self.timers, target, client_x, client_y);
        }
        false
    }

    fn run_task(&mut self, task: PageTask) {
        match task {
            PageTask::InitCharts => {
                self.charts_initialized = true;
                self.timers
                    .schedule(self.config.chart_render_delay_ms, PageTask::RenderCharts);
                debug!("chart layer initialized");
            }
            PageTask::RenderCharts => self.render_charts(),
            PageTask::InitInteractions => self.init_interactions(),
            PageTask::BindCtaButtons => {
                if let Some(effects) = &mut self.effects {
                    effects.bind_cta_buttons(&self.host);
                }
            }
            PageTask::StartEntrance => self.start_entrance(),
            PageTask::Reveal(task) => {
                self.animator.reveal(&mut self.host, &task);
            }
            PageTask::Navigation(NavigationTask::ScrollSettled) => {
                if let Some(navigation) = &mut self.navigation {
                    navigation.on_scroll_settled(&mut self.host);
                }
            }
            PageTask::Notifier(task) => {
                self.notifier
                    .on_task(&mut self.host, &mut self.timers, task);
            }
            PageTask::Effects(EffectsTask::RemoveRipple { button, ripple }) => {
                if let Some(effects) = &mut self.effects {
                    effects.remove_ripple(&mut self.host, button, ripple);
                }
            }
            PageTask::Effects(EffectsTask::CtaNotice(intent)) => {
                self.notifier.notify(
                    &mut self.host,
                    &mut self.timers,
                    intent.message(),
                    NotificationKind::Info,
                );
            }
        }
    }

    fn render_charts(&mut self) {
        if !self.charts_initialized {
            return;
        }
        let palette = &self.content.palette;
        let theme = &self.config.chart_theme;
        for slot in ChartSlot::ALL {
            let spec = match slot {
                ChartSlot::MarketGrowth => {
                    time_series_chart(&self.content.market_growth, palette, theme)
                }
                ChartSlot::Revenue => {
                    proportion_chart(&self.content.revenue_streams, palette, theme)
                }
            };
            self.charts
                .mount_or_skip(&self.host, &mut self.renderer, slot, spec);
        }
        info!(charts = self.charts.len(), "charts rendered");
    }

    fn init_interactions(&mut self) {
        self.groups = bind_groups(&self.host, &mut self.visibility, &self.config.stagger_groups);

        let entrance = &self.config.entrance;
        let cards = self.host.query_all(&entrance.selector);
        apply_styles(&mut self.host, &cards, &entrance.initial_styles);
        self.timers
            .schedule(entrance.start_delay_ms, PageTask::StartEntrance);

        self.effects = Some(InteractionEffects::bind(
            &self.host,
            self.config.effects.clone(),
        ));
        self.timers
            .schedule(self.config.cta_bind_delay_ms, PageTask::BindCtaButtons);

        let containers = self.host.query_all(&self.config.lazy_chart_selector);
        if !containers.is_empty() {
            let observer = self
                .visibility
                .create_observer(self.config.lazy_chart_observer, ObserveMode::Once);
            for container in containers {
                self.visibility.observe(observer, container);
            }
            self.lazy_observer = Some(observer);
        }

        if self.host.prefers_reduced_motion()
            && self.host.inject_stylesheet(REDUCED_MOTION_CSS).is_none()
        {
            warn!("reduced-motion stylesheet could not be injected");
        }

        debug!(
            groups = self.groups.len(),
            observers = self.visibility.observer_count(),
            "interaction layers initialized"
        );
        self.refresh_visibility();
    }

    fn start_entrance(&mut self) {
        let entrance = &self.config.entrance;
        let cards: Vec<(ElementId, usize)> = self
            .host
            .query_all(&entrance.selector)
            .into_iter()
            .enumerate()
            .map(|(index, element)| (element, index))
            .collect();
        self.animator.schedule(
            &self.host,
            &mut self.timers,
            &cards,
            &entrance.policy,
            &entrance.effect,
        );
    }

    fn on_visibility(&mut self, notice: VisibilityNotice) {
        if let Some(navigation) = &mut self.navigation {
            if navigation.on_visibility(&mut self.host, notice) {
                return;
            }
        }
        if self.lazy_observer == Some(notice.observer) {
            self.host
                .set_attribute(notice.element, "data-loaded", "true");
            debug!(element = ?notice.element, "chart container loaded");
            return;
        }
        let Some(bound) = self
            .groups
            .iter()
            .find(|bound| bound.observer == notice.observer)
        else {
            return;
        };
        let Some(index) = bound
            .members
            .iter()
            .position(|member| *member == notice.element)
        else {
            return;
        };
        let Some(group) = self.config.stagger_groups.get(bound.group) else {
            return;
        };
        self.animator.schedule(
            &self.host,
            &mut self.timers,
            &[(notice.element, index)],
            &group.policy,
            &group.effect,
        );
    }
}

fn bind_groups<H: Host + ?Sized>(
    host: &H,
    visibility: &mut VisibilityCoordinator,
    groups: &[StaggerGroup],
) -> Vec<BoundGroup> {
    groups
        .iter()
        .enumerate()
        .filter_map(|(group, config)| {
            let members = host.query_all(&config.selector);
            if members.is_empty() {
                return None;
            }
            let observer = visibility.create_observer(config.observer, ObserveMode::Once);
            for member in &members {
                visibility.observe(observer, *member);
            }
            Some(BoundGroup {
                group,
                observer,
                members,
            })
        })
        .collect()
}

impl<H: Host + std::fmt::Debug, R: ChartRenderer + std::fmt::Debug> std::fmt::Debug
    for PageController<H, R>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("phase", &self.phase)
            .field("now_ms", &self.timers.now_ms())
            .field("pending_timers", &self.timers.len())
            .field("charts", &self.charts.len())
            .finish_non_exhaustive()
    }
}
