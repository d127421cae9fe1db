use criterion::{Criterion, criterion_group, criterion_main};
use landing_rs::chart::{ChartTheme, proportion_chart, time_series_chart};
use landing_rs::core::ContentModel;
use landing_rs::host::{ElementSpec, Host, MemoryHost, Rect};
use landing_rs::scheduler::TimerQueue;
use landing_rs::visibility::{ObserveMode, ObserverConfig, RootMargin, VisibilityCoordinator};
use std::hint::black_box;

fn bench_timer_queue_10k(c: &mut Criterion) {
    c.bench_function("timer_queue_schedule_drain_10k", |b| {
        b.iter(|| {
            let mut timers = TimerQueue::new();
            for i in 0..10_000u32 {
                timers.schedule(f64::from(i % 997), i);
            }
            let mut sum = 0u64;
            timers.advance_to(1_000.0, |_, task| sum += u64::from(task));
            black_box(sum)
        })
    });
}

fn bench_visibility_evaluate_1k(c: &mut Criterion) {
    let mut host = MemoryHost::new(1920.0, 1080.0);
    let body = host.body().expect("body");
    let mut visibility = VisibilityCoordinator::new();
    let margin: RootMargin = "0px 0px -50px 0px".parse().expect("valid margin");
    let observer = visibility.create_observer(
        ObserverConfig::new(0.2).with_root_margin(margin),
        ObserveMode::Continuous,
    );
    for i in 0..1_000u32 {
        let item = host.append(body, ElementSpec::new("div").with_class("fundamental-item"));
        host.set_layout(item, Rect::new(0.0, f64::from(i) * 120.0, 400.0, 100.0));
        visibility.observe(observer, item);
    }

    let mut scroll = 0.0;
    c.bench_function("visibility_evaluate_1k_continuous", |b| {
        b.iter(|| {
            scroll = (scroll + 480.0) % 120_000.0;
            host.set_scroll_y(scroll);
            black_box(visibility.evaluate(&host).len())
        })
    });
}

fn bench_chart_specs_json(c: &mut Criterion) {
    let content = ContentModel::investor_deck();
    let theme = ChartTheme::default();

    c.bench_function("chart_specs_to_json", |b| {
        b.iter(|| {
            let line = time_series_chart(
                black_box(&content.market_growth),
                &content.palette,
                &theme,
            )
            .expect("line chart");
            let doughnut = proportion_chart(
                black_box(&content.revenue_streams),
                &content.palette,
                &theme,
            )
            .expect("doughnut chart");
            let _ = line.to_json_value().expect("line json");
            let _ = doughnut.to_json_value().expect("doughnut json");
        })
    });
}

criterion_group!(
    benches,
    bench_timer_queue_10k,
    bench_visibility_evaluate_1k,
    bench_chart_specs_json
);
criterion_main!(benches);
