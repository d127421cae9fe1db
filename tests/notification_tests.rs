use landing_rs::core::Palette;
use landing_rs::host::{Host, MemoryHost};
use landing_rs::notification::{
    CloseReason, ModalNotifier, NotificationKind, NotifierConfig, NotifierState, NotifierTask,
};
use landing_rs::scheduler::TimerQueue;

fn notifier() -> (MemoryHost, ModalNotifier, TimerQueue<NotifierTask>) {
    (
        MemoryHost::default(),
        ModalNotifier::new(NotifierConfig::default(), Palette::default()),
        TimerQueue::new(),
    )
}

fn run_until(
    host: &mut MemoryHost,
    notifier: &mut ModalNotifier,
    timers: &mut TimerQueue<NotifierTask>,
    until_ms: f64,
) {
    timers.advance_to(until_ms, |timers, task| notifier.on_task(&mut *host, timers, task));
}

#[test]
fn second_notify_replaces_the_first() {
    let (mut host, mut notifier, mut timers) = notifier();
    notifier.notify(&mut host, &mut timers, "a", NotificationKind::Info);
    notifier.notify(&mut host, &mut timers, "b", NotificationKind::Success);

    let open = host.query_all(".custom-notification");
    assert_eq!(open.len(), 1);
    let message = host
        .query_within(open[0], ".notification-message")
        .first()
        .copied()
        .expect("message paragraph");
    assert_eq!(host.text_content(message), "b");
    assert_eq!(notifier.active_message(), Some("b"));
    assert_eq!(notifier.active_kind(), Some(NotificationKind::Success));
    assert!(host.has_class(open[0], "custom-notification--success"));
}

#[test]
fn auto_close_fades_then_removes() {
    let (mut host, mut notifier, mut timers) = notifier();
    let id = notifier
        .notify(&mut host, &mut timers, "deck ready", NotificationKind::Info)
        .expect("opened");

    run_until(&mut host, &mut notifier, &mut timers, 7_999.0);
    assert_eq!(notifier.state(), NotifierState::Open);

    run_until(&mut host, &mut notifier, &mut timers, 8_000.0);
    assert_eq!(notifier.state(), NotifierState::Closing);
    let root = notifier.active_root().expect("still attached while fading");
    assert_eq!(
        host.style(root, "animation").as_deref(),
        Some("fadeOutNotification 0.3s ease-out forwards")
    );

    run_until(&mut host, &mut notifier, &mut timers, 8_300.0);
    assert_eq!(notifier.state(), NotifierState::Closed);
    assert!(notifier.active_id().is_none());
    assert!(!host.is_connected(root));
    assert!(host.query_all(".custom-notification").is_empty());
    assert_ne!(Some(id), notifier.active_id());
}

#[test]
fn close_button_and_backdrop_close_but_dialog_body_does_not() {
    let (mut host, mut notifier, mut timers) = notifier();
    notifier.notify(&mut host, &mut timers, "hello", NotificationKind::Warning);
    let root = notifier.active_root().expect("open");

    let message = host.query_within(root, ".notification-message")[0];
    assert!(!notifier.handle_click(&mut host, &mut timers, message));
    assert_eq!(notifier.state(), NotifierState::Open);

    assert!(notifier.handle_click(&mut host, &mut timers, root));
    assert_eq!(notifier.state(), NotifierState::Closing);
    // A second close while fading is ignored.
    assert!(!notifier.close(&mut host, &mut timers, CloseReason::Manual));

    let now = timers.now_ms();
    run_until(&mut host, &mut notifier, &mut timers, now + 300.0);
    assert_eq!(notifier.state(), NotifierState::Closed);

    notifier.notify(&mut host, &mut timers, "again", NotificationKind::Error);
    let root = notifier.active_root().expect("open");
    let close = host.query_within(root, ".close-notification")[0];
    assert!(notifier.handle_click(&mut host, &mut timers, close));
}

#[test]
fn stale_auto_close_does_not_touch_a_newer_notification() {
    let (mut host, mut notifier, mut timers) = notifier();
    notifier.notify(&mut host, &mut timers, "first", NotificationKind::Info);
    timers.advance_clock(5_000.0);
    notifier.notify(&mut host, &mut timers, "second", NotificationKind::Info);

    // The first notification's timer fires at 8000 and must be ignored.
    run_until(&mut host, &mut notifier, &mut timers, 12_999.0);
    assert_eq!(notifier.state(), NotifierState::Open);
    assert_eq!(notifier.active_message(), Some("second"));

    run_until(&mut host, &mut notifier, &mut timers, 13_300.0);
    assert_eq!(notifier.state(), NotifierState::Closed);
}

#[test]
fn message_text_is_never_markup() {
    let (mut host, mut notifier, mut timers) = notifier();
    notifier.notify(
        &mut host,
        &mut timers,
        "<img src=x onerror=alert(1)>",
        NotificationKind::Info,
    );
    let root = notifier.active_root().expect("open");

    assert!(host.query_within(root, "img").is_empty());
    let html = host.outer_html(root);
    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    assert!(!html.contains("<img"));
}

#[test]
fn keyframes_are_injected_once() {
    let (mut host, mut notifier, mut timers) = notifier();
    notifier.notify(&mut host, &mut timers, "a", NotificationKind::Info);
    notifier.notify(&mut host, &mut timers, "b", NotificationKind::Info);
    let sheets = host.stylesheets();
    assert_eq!(sheets.len(), 1);
    assert!(sheets[0].contains("@keyframes fadeOutNotification"));
}
