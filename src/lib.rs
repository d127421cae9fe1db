//! landing-rs: headless view-state engine for an investor landing page.
//!
//! The crate keeps all page behavior (scroll-triggered reveals, navigation
//! sync, chart configuration, modal notices and pointer effects) behind a
//! [`host::Host`] abstraction and a virtual clock, so the same logic runs
//! against an in-memory document in tests and against the browser DOM with
//! the `web-host` feature.

pub mod animation;
pub mod chart;
pub mod core;
pub mod effects;
pub mod error;
pub mod host;
pub mod navigation;
pub mod notification;
pub mod page;
pub mod scheduler;
pub mod telemetry;
pub mod visibility;

#[cfg(feature = "web-host")]
pub mod platform_web;

pub use error::{PageError, PageResult};
pub use page::{PageConfig, PageController, PageEvent};
