use landing_rs::scheduler::TimerQueue;
use proptest::prelude::*;

proptest! {
    #[test]
    fn tasks_fire_by_deadline_then_registration(delays in proptest::collection::vec(0u8..20, 1..64)) {
        let mut timers = TimerQueue::new();
        for (index, delay) in delays.iter().enumerate() {
            timers.schedule(f64::from(*delay), index);
        }

        let mut fired = Vec::new();
        let count = timers.advance_to(100.0, |_, task| fired.push(task));

        let mut expected: Vec<usize> = (0..delays.len()).collect();
        expected.sort_by_key(|index| delays[*index]);
        prop_assert_eq!(count, delays.len());
        prop_assert_eq!(fired, expected);
        prop_assert_eq!(timers.now_ms(), 100.0);
    }

    #[test]
    fn cancelled_tasks_never_fire(delays in proptest::collection::vec(0.0f64..1_000.0, 1..32), cancel_mask in any::<u32>()) {
        let mut timers = TimerQueue::new();
        let handles: Vec<_> = delays
            .iter()
            .enumerate()
            .map(|(index, delay)| timers.schedule(*delay, index))
            .collect();
        for (index, handle) in handles.iter().enumerate() {
            if cancel_mask & (1 << (index % 32)) != 0 {
                prop_assert!(timers.cancel(*handle));
                prop_assert!(!timers.cancel(*handle));
            }
        }

        let mut fired = Vec::new();
        timers.advance_to(1_000.0, |_, task| fired.push(task));
        for index in fired {
            prop_assert_eq!(cancel_mask & (1 << (index % 32)), 0);
        }
        prop_assert!(timers.is_empty());
    }
}
