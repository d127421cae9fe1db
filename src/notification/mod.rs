//! Single-slot modal notification.
//!
//! At most one notification exists per notifier. Opening a new one removes
//! the previous one immediately; closing always runs a fade-out before the
//! node leaves the document. Message text is inserted as a text node, so it
//! is never interpreted as markup.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::Palette;
use crate::host::{ElementId, ElementSpec, Host};
use crate::scheduler::TimerQueue;

const NOTIFICATION_KEYFRAMES: &str = "\
@keyframes fadeInNotification {
  from { opacity: 0; }
  to { opacity: 1; }
}
@keyframes slideInNotification {
  from { transform: translateY(-20px) scale(0.9); opacity: 0; }
  to { transform: translateY(0) scale(1); opacity: 1; }
}
@keyframes fadeOutNotification {
  from { opacity: 1; }
  to { opacity: 0; }
}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Info => "Information",
            Self::Success => "Success",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }

    #[must_use]
    pub fn modifier_class(self) -> &'static str {
        match self {
            Self::Info => "custom-notification--info",
            Self::Success => "custom-notification--success",
            Self::Warning => "custom-notification--warning",
            Self::Error => "custom-notification--error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierTask {
    AutoClose(NotificationId),
    Remove(NotificationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    Manual,
    Backdrop,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifierState {
    Closed,
    Open,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub auto_dismiss_ms: f64,
    pub close_transition_ms: f64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            auto_dismiss_ms: 8000.0,
            close_transition_ms: 300.0,
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveNotification {
    id: NotificationId,
    kind: NotificationKind,
    message: String,
    root: ElementId,
    close_buttons: Vec<ElementId>,
    closing: bool,
}

#[derive(Debug, Clone)]
pub struct ModalNotifier {
    config: NotifierConfig,
    palette: Palette,
    active: Option<ActiveNotification>,
    next_id: u64,
    keyframes_injected: bool,
}

impl ModalNotifier {
    #[must_use]
    pub fn new(config: NotifierConfig, palette: Palette) -> Self {
        Self {
            config,
            palette,
            active: None,
            next_id: 0,
            keyframes_injected: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> NotifierState {
        match &self.active {
            None => NotifierState::Closed,
            Some(active) if active.closing => NotifierState::Closing,
            Some(_) => NotifierState::Open,
        }
    }

    #[must_use]
    pub fn active_id(&self) -> Option<NotificationId> {
        self.active.as_ref().map(|active| active.id)
    }

    #[must_use]
    pub fn active_root(&self) -> Option<ElementId> {
        self.active.as_ref().map(|active| active.root)
    }

    #[must_use]
    pub fn active_message(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.message.as_str())
    }

    #[must_use]
    pub fn active_kind(&self) -> Option<NotificationKind> {
        self.active.as_ref().map(|active| active.kind)
    }

    /// Opens a notification, replacing any existing one without a fade.
    ///
    /// Returns `None` when the host has no document body.
    pub fn notify<H, T>(
        &mut self,
        host: &mut H,
        timers: &mut TimerQueue<T>,
        message: &str,
        kind: NotificationKind,
    ) -> Option<NotificationId>
    where
        H: Host + ?Sized,
        T: From<NotifierTask>,
    {
        self.dismiss_now(host);

        let Some(body) = host.body() else {
            debug!("notification skipped: no document body");
            return None;
        };
        if !self.keyframes_injected {
            self.keyframes_injected = host.inject_stylesheet(NOTIFICATION_KEYFRAMES).is_some();
        }

        let root = host.create_element(body, &self.build_spec(message, kind))?;
        let close_buttons = host.query_within(root, ".notification-close, .close-notification");

        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.active = Some(ActiveNotification {
            id,
            kind,
            message: message.to_owned(),
            root,
            close_buttons,
            closing: false,
        });
        timers.schedule(self.config.auto_dismiss_ms, T::from(NotifierTask::AutoClose(id)));
        debug!(?id, ?kind, "notification opened");
        Some(id)
    }

    /// Routes a click. Close buttons and the backdrop itself start closing;
    /// clicks inside the dialog body do nothing. Returns `true` when the
    /// click started a close.
    pub fn handle_click<H, T>(
        &mut self,
        host: &mut H,
        timers: &mut TimerQueue<T>,
        target: ElementId,
    ) -> bool
    where
        H: Host + ?Sized,
        T: From<NotifierTask>,
    {
        let Some(active) = &self.active else {
            return false;
        };
        let reason = if active
            .close_buttons
            .iter()
            .any(|button| host.contains(*button, target))
        {
            CloseReason::Manual
        } else if target == active.root {
            CloseReason::Backdrop
        } else {
            return false;
        };
        self.close(host, timers, reason)
    }

    /// Starts the fade-out and arms final removal. Returns `false` when
    /// nothing is open or a close is already running.
    pub fn close<H, T>(&mut self, host: &mut H, timers: &mut TimerQueue<T>, reason: CloseReason) -> bool
    where
        H: Host + ?Sized,
        T: From<NotifierTask>,
    {
        let Some(active) = self.active.as_mut().filter(|active| !active.closing) else {
            return false;
        };
        active.closing = true;
        host.set_style(
            active.root,
            "animation",
            &format!(
                "fadeOutNotification {}s ease-out forwards",
                self.config.close_transition_ms / 1000.0
            ),
        );
        timers.schedule(
            self.config.close_transition_ms,
            T::from(NotifierTask::Remove(active.id)),
        );
        debug!(id = ?active.id, ?reason, "notification closing");
        true
    }

    /// Handles a fired timer. Tasks for notifications that are no longer
    /// current are ignored.
    pub fn on_task<H, T>(&mut self, host: &mut H, timers: &mut TimerQueue<T>, task: NotifierTask)
    where
        H: Host + ?Sized,
        T: From<NotifierTask>,
    {
        match task {
            NotifierTask::AutoClose(id) => {
                let live = self
                    .active
                    .as_ref()
                    .is_some_and(|active| active.id == id && host.is_connected(active.root));
                if live {
                    self.close(host, timers, CloseReason::Timeout);
                }
            }
            NotifierTask::Remove(id) => {
                if self.active.as_ref().is_some_and(|active| active.id == id && active.closing) {
                    self.dismiss_now(host);
                }
            }
        }
    }

    /// Removes the current notification immediately, without a fade.
    pub fn dismiss_now<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        if host.is_connected(active.root) {
            host.remove_element(active.root);
        }
        debug!(id = ?active.id, "notification removed");
        true
    }

    fn build_spec(&self, message: &str, kind: NotificationKind) -> ElementSpec {
        let palette = &self.palette;
        let header = ElementSpec::new("div")
            .with_class("notification-header")
            .with_style("display", "flex")
            .with_style("justify-content", "space-between")
            .with_style("align-items", "center")
            .with_style("margin-bottom", "16px")
            .with_child(
                ElementSpec::new("h3")
                    .with_style("margin", "0")
                    .with_style("color", palette.charcoal.to_css())
                    .with_style("font-size", "1.1rem")
                    .with_style("font-weight", "600")
                    .with_text(kind.title()),
            )
            .with_child(
                ElementSpec::new("button")
                    .with_class("notification-close")
                    .with_attribute("aria-label", "Close")
                    .with_style("background", "none")
                    .with_style("border", "none")
                    .with_style("font-size", "1.5rem")
                    .with_style("cursor", "pointer")
                    .with_style("color", palette.medium_gray.to_css())
                    .with_text("\u{00D7}"),
            );

        let content = ElementSpec::new("div")
            .with_class("notification-content")
            .with_attribute("role", "dialog")
            .with_attribute("aria-modal", "true")
            .with_style("background", palette.pure_white.to_css())
            .with_style("padding", "32px")
            .with_style("border-radius", "16px")
            .with_style(
                "box-shadow",
                format!("0 20px 60px {}", palette.charcoal.with_alpha8(0x33)),
            )
            .with_style("max-width", "500px")
            .with_style("width", "90%")
            .with_style("text-align", "center")
            .with_style("border", format!("2px solid {}", palette.light_blue))
            .with_style("transform", "translateY(-20px) scale(0.9)")
            .with_style("animation", "slideInNotification 0.4s ease-out 0.1s forwards")
            .with_child(header)
            .with_child(
                ElementSpec::new("p")
                    .with_class("notification-message")
                    .with_style("margin", "16px 0 24px 0")
                    .with_style("color", palette.dark_gray.to_css())
                    .with_style("line-height", "1.6")
                    .with_style("font-size", "1rem")
                    .with_text(message),
            )
            .with_child(
                ElementSpec::new("button")
                    .with_class("btn")
                    .with_class("btn--primary")
                    .with_class("btn--sm")
                    .with_class("close-notification")
                    .with_text("Close"),
            );

        ElementSpec::new("div")
            .with_class("custom-notification")
            .with_class(kind.modifier_class())
            .with_style("position", "fixed")
            .with_style("inset", "0")
            .with_style("background", palette.charcoal.with_alpha8(0x66).to_css())
            .with_style("display", "flex")
            .with_style("align-items", "center")
            .with_style("justify-content", "center")
            .with_style("z-index", "10000")
            .with_style("backdrop-filter", "blur(12px)")
            .with_style("opacity", "0")
            .with_style("animation", "fadeInNotification 0.4s ease-out forwards")
            .with_child(content)
    }
}
