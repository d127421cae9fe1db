use landing_rs::host::{ElementId, ElementSpec, Host, MemoryHost, Rect, ScrollBehavior};
use landing_rs::navigation::{NavigationConfig, NavigationSync, NavigationTask};
use landing_rs::scheduler::TimerQueue;
use landing_rs::visibility::VisibilityCoordinator;

struct Fixture {
    host: MemoryHost,
    nav_bar: ElementId,
    links: Vec<ElementId>,
    sections: Vec<ElementId>,
}

fn fixture() -> Fixture {
    let mut host = MemoryHost::new(1200.0, 800.0);
    let body = host.body().expect("body");
    let nav_bar = host.append(body, ElementSpec::new("nav").with_class("nav-bar"));
    let links = ["#overview", "#team", "#contact", "https://example.com/deck"]
        .into_iter()
        .map(|href| {
            host.append(
                nav_bar,
                ElementSpec::new("a")
                    .with_class("nav-link")
                    .with_attribute("href", href)
                    .with_child(ElementSpec::new("span").with_text("link")),
            )
        })
        .collect();
    let sections = ["overview", "team", "contact"]
        .into_iter()
        .enumerate()
        .map(|(index, id)| {
            let section = host.append(body, ElementSpec::new("section").with_attribute("id", id));
            host.set_layout(section, Rect::new(0.0, 1000.0 * index as f64, 1200.0, 1000.0));
            section
        })
        .collect();
    Fixture {
        host,
        nav_bar,
        links,
        sections,
    }
}

#[test]
fn only_hash_links_are_bound() {
    let Fixture { host, links, .. } = fixture();
    let mut visibility = VisibilityCoordinator::new();
    let nav = NavigationSync::bind(&host, &mut visibility, NavigationConfig::default());

    let bound: Vec<_> = nav.links().iter().map(|link| link.element).collect();
    assert_eq!(bound, links[..3].to_vec());
    assert_eq!(nav.links()[1].target, "team");
}

#[test]
fn clicking_team_marks_it_active_before_the_scroll_ends() {
    let Fixture {
        mut host, links, ..
    } = fixture();
    let mut visibility = VisibilityCoordinator::new();
    let mut nav = NavigationSync::bind(&host, &mut visibility, NavigationConfig::default());

    // Click lands on the span inside the link.
    let inner = host.children(links[1])[0];
    assert!(nav.on_click(&mut host, inner));

    assert_eq!(nav.active_section(), Some("team"));
    assert!(host.has_class(links[1], "active"));
    assert!(!host.has_class(links[0], "active"));
    let request = host.scroll_requests().last().copied().expect("scroll requested");
    assert_eq!(request.top, 920.0);
    assert_eq!(request.behavior, ScrollBehavior::Smooth);
    assert_eq!(host.viewport().scroll_y, 0.0, "smooth scroll still in flight");
}

#[test]
fn external_link_clicks_pass_through() {
    let Fixture {
        mut host, links, ..
    } = fixture();
    let mut visibility = VisibilityCoordinator::new();
    let mut nav = NavigationSync::bind(&host, &mut visibility, NavigationConfig::default());

    assert!(!nav.on_click(&mut host, links[3]));
    assert!(host.scroll_requests().is_empty());
    assert!(nav.active_section().is_none());
}

#[test]
fn scroll_spy_follows_visible_sections() {
    let Fixture {
        mut host,
        links,
        sections,
        ..
    } = fixture();
    let mut visibility = VisibilityCoordinator::new();
    let mut nav = NavigationSync::bind(&host, &mut visibility, NavigationConfig::default());

    for notice in visibility.evaluate(&host) {
        nav.on_visibility(&mut host, notice);
    }
    assert_eq!(nav.active_section(), Some("overview"));

    host.set_scroll_y(2000.0);
    let notices = visibility.evaluate(&host);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].element, sections[2]);
    for notice in notices {
        nav.on_visibility(&mut host, notice);
    }
    assert_eq!(nav.active_section(), Some("contact"));
    assert!(host.has_class(links[2], "active"));
    assert_eq!(
        links
            .iter()
            .filter(|link| host.has_class(**link, "active"))
            .count(),
        1
    );
}

#[test]
fn later_section_wins_when_one_sample_shows_two() {
    let Fixture {
        mut host,
        links,
        sections,
        ..
    } = fixture();
    // Short team and contact sections that both fit the spy band at once.
    host.set_layout(sections[1], Rect::new(0.0, 1100.0, 1200.0, 100.0));
    host.set_layout(sections[2], Rect::new(0.0, 1250.0, 1200.0, 100.0));
    let mut visibility = VisibilityCoordinator::new();
    let mut nav = NavigationSync::bind(&host, &mut visibility, NavigationConfig::default());

    host.set_scroll_y(1000.0);
    let notices = visibility.evaluate(&host);
    let seen: Vec<_> = notices.iter().map(|notice| notice.element).collect();
    assert_eq!(seen, vec![sections[1], sections[2]]);
    for notice in notices {
        nav.on_visibility(&mut host, notice);
    }

    assert_eq!(nav.active_section(), Some("contact"));
    let active: Vec<_> = links
        .iter()
        .copied()
        .filter(|link| host.has_class(*link, "active"))
        .collect();
    assert_eq!(active, vec![links[2]]);
}

#[test]
fn nav_bar_elevation_is_debounced() {
    let Fixture {
        mut host, nav_bar, ..
    } = fixture();
    let mut visibility = VisibilityCoordinator::new();
    let mut nav = NavigationSync::bind(&host, &mut visibility, NavigationConfig::default());
    let mut timers = TimerQueue::<NavigationTask>::new();

    host.set_scroll_y(150.0);
    nav.on_scroll(&mut timers);
    timers.advance_clock(5.0);
    nav.on_scroll(&mut timers);
    assert_eq!(timers.len(), 1, "debounce keeps a single pending timer");

    assert!(timers.pop_due(14.0).is_none());
    assert_eq!(timers.pop_due(15.0), Some(NavigationTask::ScrollSettled));
    nav.on_scroll_settled(&mut host);
    assert!(nav.is_elevated());
    assert_eq!(
        host.style(nav_bar, "background").as_deref(),
        Some("rgba(255, 255, 255, 0.98)")
    );

    host.set_scroll_y(0.0);
    nav.on_scroll_settled(&mut host);
    assert!(!nav.is_elevated());
    assert_eq!(host.style(nav_bar, "box-shadow").as_deref(), Some("none"));
}
