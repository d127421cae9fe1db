use landing_rs::chart::{ChartSlot, NullChartRenderer};
use landing_rs::core::ContentModel;
use landing_rs::host::{ElementId, ElementSpec, Host, MemoryHost, Rect};
use landing_rs::notification::{NotificationKind, NotifierState};
use landing_rs::page::{PageConfig, PageController, PageEvent, PagePhase};

type Page = PageController<MemoryHost, NullChartRenderer>;

fn at(host: &mut MemoryHost, parent: ElementId, spec: ElementSpec, rect: Rect) -> ElementId {
    let element = host.append(parent, spec);
    host.set_layout(element, rect);
    element
}

fn investor_page() -> MemoryHost {
    let mut host = MemoryHost::new(1200.0, 800.0);
    let body = host.body().expect("body");

    let nav = at(
        &mut host,
        body,
        ElementSpec::new("nav").with_class("nav-bar"),
        Rect::new(0.0, 0.0, 1200.0, 70.0),
    );
    for target in ["#overview", "#team"] {
        host.append(
            nav,
            ElementSpec::new("a")
                .with_class("nav-link")
                .with_attribute("href", target)
                .with_text(&target[1..]),
        );
    }

    let overview = at(
        &mut host,
        body,
        ElementSpec::new("section").with_attribute("id", "overview"),
        Rect::new(0.0, 0.0, 1200.0, 1000.0),
    );
    for index in 0..3 {
        at(
            &mut host,
            overview,
            ElementSpec::new("div").with_class("metric-card"),
            Rect::new(100.0 + 300.0 * f64::from(index), 150.0, 250.0, 120.0),
        );
    }
    let charts = at(
        &mut host,
        overview,
        ElementSpec::new("div").with_class("chart-container"),
        Rect::new(0.0, 300.0, 1200.0, 400.0),
    );
    host.append(
        charts,
        ElementSpec::new("canvas").with_attribute("id", "marketGrowthChart"),
    );
    host.append(
        charts,
        ElementSpec::new("canvas").with_attribute("id", "revenueChart"),
    );
    let cta = host.append(overview, ElementSpec::new("div").with_class("cta-buttons"));
    at(
        &mut host,
        cta,
        ElementSpec::new("button")
            .with_class("btn")
            .with_text("Schedule Due Diligence Review"),
        Rect::new(100.0, 720.0, 240.0, 48.0),
    );

    let team = at(
        &mut host,
        body,
        ElementSpec::new("section").with_attribute("id", "team"),
        Rect::new(0.0, 1000.0, 1200.0, 1000.0),
    );
    for index in 0..2 {
        at(
            &mut host,
            team,
            ElementSpec::new("div")
                .with_class("fundamental-item")
                .with_attribute("data-index", index.to_string()),
            Rect::new(100.0 + 400.0 * f64::from(index), 1200.0, 300.0, 100.0),
        );
    }
    at(
        &mut host,
        team,
        ElementSpec::new("div").with_class("pillar-card"),
        Rect::new(100.0, 1600.0, 300.0, 200.0),
    );
    host
}

fn page(host: MemoryHost) -> Page {
    PageController::new(
        host,
        NullChartRenderer::default(),
        ContentModel::investor_deck(),
        PageConfig::default(),
    )
    .expect("page init")
}

fn first(page: &Page, selector: &str) -> ElementId {
    page.host().query(selector).expect(selector)
}

#[test]
fn page_smoke_flow() {
    let mut page = page(investor_page());
    page.start(0.0);
    assert_eq!(page.phase(), PagePhase::Running);

    let pillar = first(&page, ".pillar-card");
    assert_eq!(page.host().style(pillar, "opacity").as_deref(), Some("0"));
    assert_eq!(
        page.navigation().and_then(|nav| nav.active_section()),
        Some("overview")
    );

    // Charts: constructed at 300, rendered 500 later.
    page.advance_to(799.0);
    assert!(page.charts().is_empty());
    page.advance_to(800.0);
    assert_eq!(page.charts().len(), 2);
    assert!(page.charts().get(ChartSlot::Revenue).is_some());
    let container = first(&page, ".chart-container");
    assert_eq!(
        page.host().attribute(container, "data-loaded").as_deref(),
        Some("true")
    );

    // Metric cards start hidden at 600 and enter from 1600, 150ms apart.
    let cards = page.host().query_all(".metric-card");
    assert_eq!(page.host().style(cards[0], "opacity").as_deref(), Some("0"));
    page.advance_to(1_600.0);
    assert_eq!(page.host().style(cards[0], "opacity").as_deref(), Some("1"));
    assert_eq!(page.host().style(cards[1], "opacity").as_deref(), Some("0"));
    page.advance_to(1_900.0);
    assert!(
        cards
            .iter()
            .all(|card| page.host().style(*card, "opacity").as_deref() == Some("1"))
    );

    // Scrolling the team section into view staggers its items.
    page.host_mut().set_scroll_y(900.0);
    assert!(!page.dispatch(1_900.0, PageEvent::Scroll));
    assert_eq!(
        page.navigation().and_then(|nav| nav.active_section()),
        Some("team")
    );
    let items = page.host().query_all(".fundamental-item");
    page.advance_to(1_900.0);
    assert!(page.host().has_class(items[0], "animate"));
    assert!(!page.host().has_class(items[1], "animate"));
    page.advance_to(2_050.0);
    assert!(page.host().has_class(items[1], "animate"));

    // Debounced nav bar update after the scroll.
    let nav_bar = first(&page, ".nav-bar");
    assert_eq!(
        page.host().style(nav_bar, "background").as_deref(),
        Some("rgba(255, 255, 255, 0.98)")
    );

    page.dispatch(2_050.0, PageEvent::Load);
    let body = page.host().body().expect("body");
    assert!(page.host().has_class(body, "loaded"));

    page.shutdown();
    assert_eq!(page.phase(), PagePhase::ShutDown);
    assert_eq!(page.renderer().live_count(), 0);
    assert!(page.timers().is_empty());
    assert_eq!(page.visibility().observer_count(), 0);
}

#[test]
fn nav_click_is_prevented_and_marks_the_target() {
    let mut page = page(investor_page());
    page.start(0.0);
    let team_link = first(&page, "a[href=\"#team\"]");

    let prevented = page.dispatch(
        0.0,
        PageEvent::Click {
            target: team_link,
            client_x: 10.0,
            client_y: 10.0,
        },
    );

    assert!(prevented);
    assert!(page.host().has_class(team_link, "active"));
    let request = page.host().scroll_requests().last().copied().expect("scroll");
    assert_eq!(request.top, 920.0);
}

#[test]
fn cta_click_opens_a_notice_after_a_short_delay() {
    let mut page = page(investor_page());
    page.start(0.0);
    page.advance_to(1_100.0);
    let button = first(&page, ".cta-buttons .btn");

    let prevented = page.dispatch(
        1_100.0,
        PageEvent::Click {
            target: button,
            client_x: 150.0,
            client_y: 740.0,
        },
    );
    assert!(!prevented);
    assert_eq!(page.host().query_within(button, ".ripple").len(), 1);

    page.advance_to(1_299.0);
    assert_eq!(page.notifier().state(), NotifierState::Closed);
    page.advance_to(1_300.0);
    assert!(
        page.notifier()
            .active_message()
            .is_some_and(|message| message.starts_with("Due diligence review scheduling"))
    );

    let close = first(&page, ".notification-close");
    page.dispatch(
        1_300.0,
        PageEvent::Click {
            target: close,
            client_x: 0.0,
            client_y: 0.0,
        },
    );
    page.advance_to(1_700.0);
    assert_eq!(page.notifier().state(), NotifierState::Closed);
    assert!(page.host().query_within(button, ".ripple").is_empty());
}

#[test]
fn notify_replaces_and_shutdown_removes() {
    let mut page = page(investor_page());
    page.start(0.0);
    page.notify(0.0, "a", NotificationKind::Info).expect("first");
    page.notify(0.0, "b", NotificationKind::Warning).expect("second");
    assert_eq!(page.host().query_all(".custom-notification").len(), 1);
    assert_eq!(page.notifier().active_message(), Some("b"));

    page.shutdown();
    assert!(page.host().query_all(".custom-notification").is_empty());
    page.shutdown();
    assert_eq!(page.phase(), PagePhase::ShutDown);
}

#[test]
fn reduced_motion_injects_an_override() {
    let mut host = investor_page();
    host.set_prefers_reduced_motion(true);
    let mut page = page(host);
    page.start(0.0);
    page.advance_to(600.0);

    assert!(
        page.host()
            .stylesheets()
            .iter()
            .any(|css| css.contains("animation-duration: 0.01ms"))
    );
}

#[test]
fn missing_sections_and_canvases_are_tolerated() {
    let mut page = page(MemoryHost::default());
    page.start(0.0);
    page.advance_to(5_000.0);
    assert!(page.charts().is_empty());
    assert!(page.navigation().is_some_and(|nav| nav.links().is_empty()));
    assert!(!page.dispatch(5_000.0, PageEvent::Scroll));
}

#[test]
fn invalid_content_is_rejected_up_front() {
    let mut content = ContentModel::investor_deck();
    content.market_growth.clear();
    let result = PageController::new(
        MemoryHost::default(),
        NullChartRenderer::default(),
        content,
        PageConfig::default(),
    );
    assert!(result.is_err());
}

fn revealed(page: &Page, cards: &[ElementId]) -> Vec<bool> {
    cards
        .iter()
        .map(|card| page.host().style(*card, "opacity").as_deref() == Some("1"))
        .collect()
}

#[test]
fn stagger_delays_start_at_the_event_time() {
    let mut host = MemoryHost::new(1200.0, 800.0);
    let body = host.body().expect("body");
    let cards: Vec<ElementId> = (0..4)
        .map(|index| {
            at(
                &mut host,
                body,
                ElementSpec::new("div").with_class("pillar-card"),
                Rect::new(300.0 * f64::from(index), 2000.0, 250.0, 200.0),
            )
        })
        .collect();
    let mut page = page(host);
    page.start(0.0);
    page.advance_to(600.0);

    // Nothing advanced the clock between 600 and the scroll at 3000.
    page.host_mut().set_scroll_y(1700.0);
    page.dispatch(3_000.0, PageEvent::Scroll);
    assert_eq!(page.now_ms(), 3_000.0);
    assert_eq!(revealed(&page, &cards), vec![false; 4]);

    page.advance_to(3_000.0);
    assert_eq!(revealed(&page, &cards), vec![true, false, false, false]);
    page.advance_to(3_199.0);
    assert_eq!(revealed(&page, &cards), vec![true, false, false, false]);
    page.advance_to(3_200.0);
    assert_eq!(revealed(&page, &cards), vec![true, true, false, false]);
    page.advance_to(3_600.0);
    assert_eq!(revealed(&page, &cards), vec![true; 4]);
}

#[test]
fn auto_dismiss_counts_from_the_notify_time() {
    let mut page = page(investor_page());
    page.start(0.0);
    page.notify(5_000.0, "later", NotificationKind::Success)
        .expect("opened");

    page.advance_to(12_999.0);
    assert_eq!(page.notifier().state(), NotifierState::Open);
    page.advance_to(13_000.0);
    assert_eq!(page.notifier().state(), NotifierState::Closing);
    page.advance_to(13_300.0);
    assert_eq!(page.notifier().state(), NotifierState::Closed);
}
