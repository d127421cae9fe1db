use landing_rs::host::{ElementSpec, Host, MemoryHost, Rect, ViewportMetrics};
use landing_rs::visibility::{
    ObserveMode, ObserverConfig, RootMargin, VisibilityCoordinator, intersection_ratio,
};
use proptest::prelude::*;

fn host_with_card(top: f64) -> (MemoryHost, landing_rs::host::ElementId) {
    let mut host = MemoryHost::new(1000.0, 800.0);
    let body = host.body().expect("body");
    let card = host.append(body, ElementSpec::new("div").with_class("card"));
    host.set_layout(card, Rect::new(0.0, top, 200.0, 100.0));
    (host, card)
}

#[test]
fn once_observer_notifies_a_single_time_across_scrolls() {
    let (mut host, card) = host_with_card(1200.0);
    let mut visibility = VisibilityCoordinator::new();
    let observer = visibility.create_observer(ObserverConfig::new(0.2), ObserveMode::Once);
    assert!(visibility.observe(observer, card));

    assert!(visibility.evaluate(&host).is_empty());

    host.set_scroll_y(600.0);
    let notices = visibility.evaluate(&host);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].element, card);
    assert!(visibility.is_notified(observer, card));

    host.set_scroll_y(0.0);
    assert!(visibility.evaluate(&host).is_empty());
    host.set_scroll_y(600.0);
    assert!(visibility.evaluate(&host).is_empty());
}

#[test]
fn continuous_observer_renotifies_after_leaving() {
    let (mut host, card) = host_with_card(100.0);
    let mut visibility = VisibilityCoordinator::new();
    let observer = visibility.create_observer(ObserverConfig::new(0.3), ObserveMode::Continuous);
    visibility.observe(observer, card);

    assert_eq!(visibility.evaluate(&host).len(), 1);
    assert!(visibility.evaluate(&host).is_empty(), "still visible, no edge");

    host.set_scroll_y(2000.0);
    assert!(visibility.evaluate(&host).is_empty());
    host.set_scroll_y(0.0);
    assert_eq!(visibility.evaluate(&host).len(), 1);
}

#[test]
fn threshold_is_inclusive() {
    let mut visibility = VisibilityCoordinator::new();
    let (mut host, card) = host_with_card(0.0);
    let observer = visibility.create_observer(ObserverConfig::new(0.5), ObserveMode::Once);
    visibility.observe(observer, card);

    // Half of the 100px card is above the viewport.
    host.set_scroll_y(50.0);
    let notices = visibility.evaluate(&host);
    assert_eq!(notices.len(), 1);
    assert!((notices[0].ratio - 0.5).abs() <= 1e-9);
}

#[test]
fn root_margin_shrinks_the_observed_area() {
    let margin: RootMargin = "0px 0px -50px 0px".parse().expect("margin");
    let root = margin.apply(ViewportMetrics::new(1000.0, 800.0, 0.0));
    assert_eq!(root, Rect::new(0.0, 0.0, 1000.0, 750.0));

    // A card straddling the bottom edge loses the slice under the margin.
    let card = Rect::new(0.0, 700.0, 100.0, 100.0);
    let ratio = intersection_ratio(root, card).expect("touching");
    assert!((ratio - 0.5).abs() <= 1e-9);
}

#[test]
fn report_ignores_untracked_elements() {
    let (_, card) = host_with_card(0.0);
    let mut visibility = VisibilityCoordinator::new();
    let observer = visibility.create_observer(ObserverConfig::new(0.0), ObserveMode::Once);
    assert!(visibility.report(observer, card, Some(1.0)).is_none());
}

#[test]
fn disconnect_all_drops_every_observer() {
    let (host, card) = host_with_card(0.0);
    let mut visibility = VisibilityCoordinator::new();
    let first = visibility.create_observer(ObserverConfig::new(0.1), ObserveMode::Once);
    let second = visibility.create_observer(ObserverConfig::new(0.1), ObserveMode::Continuous);
    visibility.observe(first, card);
    visibility.observe(second, card);
    assert_eq!(visibility.observer_count(), 2);

    visibility.disconnect_all();
    assert_eq!(visibility.observer_count(), 0);
    assert!(visibility.evaluate(&host).is_empty());
}

proptest! {
    #[test]
    fn once_mode_never_notifies_twice(samples in proptest::collection::vec(proptest::option::of(0.0f64..=1.0), 1..40)) {
        let (_, card) = host_with_card(0.0);
        let mut visibility = VisibilityCoordinator::new();
        let observer = visibility.create_observer(ObserverConfig::new(0.2), ObserveMode::Once);
        visibility.observe(observer, card);

        let notices = samples
            .iter()
            .filter_map(|ratio| visibility.report(observer, card, *ratio))
            .count();
        let ever_visible = samples.iter().flatten().any(|ratio| *ratio >= 0.2);

        prop_assert_eq!(notices, usize::from(ever_visible));
    }
}
