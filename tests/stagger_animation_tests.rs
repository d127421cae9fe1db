use landing_rs::animation::{DelayPolicy, RevealEffect, RevealTask, SequencedAnimator, TrackedState};
use landing_rs::host::{ElementId, ElementSpec, Host, MemoryHost};
use landing_rs::scheduler::TimerQueue;
use proptest::prelude::*;

fn host_with_items(count: usize) -> (MemoryHost, Vec<ElementId>) {
    let mut host = MemoryHost::default();
    let body = host.body().expect("body");
    let items = (0..count)
        .map(|index| {
            host.append(
                body,
                ElementSpec::new("div")
                    .with_class("fundamental-item")
                    .with_attribute("data-index", index.to_string()),
            )
        })
        .collect();
    (host, items)
}

/// Runs every due reveal and records `(time, element)` for each applied one.
fn drain(
    host: &mut MemoryHost,
    animator: &mut SequencedAnimator,
    timers: &mut TimerQueue<RevealTask>,
    until_ms: f64,
) -> Vec<(f64, ElementId)> {
    let mut fired = Vec::new();
    while let Some(deadline) = timers.next_deadline().filter(|deadline| *deadline <= until_ms) {
        let task = timers.pop_due(deadline).expect("due task");
        if animator.reveal(host, &task) {
            fired.push((deadline, task.element));
        }
    }
    timers.advance_clock(until_ms);
    fired
}

#[test]
fn linear_stagger_fires_in_index_order() {
    let (mut host, items) = host_with_items(4);
    let mut animator = SequencedAnimator::new();
    let mut timers = TimerQueue::<RevealTask>::new();
    let indexed: Vec<_> = items.iter().copied().enumerate().map(|(i, e)| (e, i)).collect();

    animator.schedule(
        &host,
        &mut timers,
        &indexed,
        &DelayPolicy::linear(150.0),
        &RevealEffect::class("animate"),
    );
    let fired = drain(&mut host, &mut animator, &mut timers, 1_000.0);

    assert_eq!(
        fired,
        vec![(0.0, items[0]), (150.0, items[1]), (300.0, items[2]), (450.0, items[3])]
    );
    assert!(items.iter().all(|item| host.has_class(*item, "animate")));
    assert_eq!(animator.animated_count(), 4);
}

#[test]
fn attribute_policy_reads_data_index() {
    let (mut host, items) = host_with_items(3);
    host.set_attribute(items[0], "data-index", "2");
    host.set_attribute(items[2], "data-index", "0");
    let mut animator = SequencedAnimator::new();
    let mut timers = TimerQueue::<RevealTask>::new();

    let indexed: Vec<_> = items.iter().copied().enumerate().map(|(i, e)| (e, i)).collect();
    animator.schedule(
        &host,
        &mut timers,
        &indexed,
        &DelayPolicy::attribute("data-index", 100.0),
        &RevealEffect::class("animate"),
    );
    let order: Vec<_> = drain(&mut host, &mut animator, &mut timers, 1_000.0)
        .into_iter()
        .map(|(_, element)| element)
        .collect();

    assert_eq!(order, vec![items[2], items[1], items[0]]);
}

#[test]
fn malformed_attribute_counts_as_zero() {
    let (mut host, items) = host_with_items(1);
    host.set_attribute(items[0], "data-index", "soon");
    let policy = DelayPolicy::attribute("data-index", 150.0);
    assert_eq!(policy.delay_ms(&host, items[0], 5), 0.0);

    host.set_attribute(items[0], "data-index", "3rd");
    assert_eq!(policy.delay_ms(&host, items[0], 5), 450.0);
}

#[test]
fn rescheduling_never_retriggers() {
    let (mut host, items) = host_with_items(2);
    let mut animator = SequencedAnimator::new();
    let mut timers = TimerQueue::<RevealTask>::new();
    let policy = DelayPolicy::linear(100.0);
    let effect = RevealEffect::Styles(vec![("opacity".to_owned(), "1".to_owned())]);

    let first = animator.schedule(&host, &mut timers, &[(items[0], 0)], &policy, &effect);
    let again = animator.schedule(&host, &mut timers, &[(items[0], 0)], &policy, &effect);
    assert_eq!(first.len(), 1);
    assert!(again.is_empty());

    drain(&mut host, &mut animator, &mut timers, 500.0);
    assert_eq!(
        animator.tracked(items[0]).map(|tracked| tracked.state),
        Some(TrackedState::Animated)
    );
    assert!(
        animator
            .schedule(&host, &mut timers, &[(items[0], 0)], &policy, &effect)
            .is_empty()
    );
    assert_eq!(host.style(items[0], "opacity").as_deref(), Some("1"));
    assert!(animator.tracked(items[1]).is_none());
}

#[test]
fn detached_elements_are_skipped() {
    let (mut host, items) = host_with_items(1);
    let mut animator = SequencedAnimator::new();
    let mut timers = TimerQueue::<RevealTask>::new();
    animator.schedule(
        &host,
        &mut timers,
        &[(items[0], 0)],
        &DelayPolicy::linear(10.0),
        &RevealEffect::class("animate"),
    );
    assert!(host.remove_element(items[0]));

    assert!(drain(&mut host, &mut animator, &mut timers, 100.0).is_empty());
    assert!(!host.has_class(items[0], "animate"));
}

proptest! {
    #[test]
    fn stagger_fires_at_exact_multiples(count in 1usize..12, step in 1.0f64..500.0, start in 0.0f64..5_000.0) {
        let (mut host, items) = host_with_items(count);
        let mut animator = SequencedAnimator::new();
        let mut timers = TimerQueue::<RevealTask>::starting_at(start);
        let indexed: Vec<_> = items.iter().copied().enumerate().map(|(i, e)| (e, i)).collect();

        animator.schedule(&host, &mut timers, &indexed, &DelayPolicy::linear(step), &RevealEffect::class("animate"));
        let fired = drain(&mut host, &mut animator, &mut timers, start + step * count as f64);

        prop_assert_eq!(fired.len(), count);
        for (index, (time, element)) in fired.iter().enumerate() {
            prop_assert_eq!(*element, items[index]);
            let expected = start + index as f64 * step;
            prop_assert!((time - expected).abs() <= 1e-9);
            prop_assert!(*time >= start + index as f64 * step - 1e-9);
            prop_assert!(*time < start + (index + 1) as f64 * step);
        }
    }

    #[test]
    fn repeated_visibility_animates_once(repeats in 1usize..20) {
        let (mut host, items) = host_with_items(1);
        let mut animator = SequencedAnimator::new();
        let mut timers = TimerQueue::<RevealTask>::new();
        let mut applied = 0;
        for _ in 0..repeats {
            animator.schedule(&host, &mut timers, &[(items[0], 0)], &DelayPolicy::linear(50.0), &RevealEffect::class("animate"));
            let until = timers.now_ms() + 100.0;
            applied += drain(&mut host, &mut animator, &mut timers, until).len();
        }
        prop_assert_eq!(applied, 1);
    }
}
