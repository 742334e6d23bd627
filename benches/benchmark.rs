//! Benchmarks for the portfolio behaviors.
//!
//! Run with: cargo bench

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use portfolio_behavior::{
    ContactSubmission, ElementSpec, ManualScheduler, MemoryPage, Page, RootMargin, Typewriter,
    TypewriterConfig, VisibilityAnimator,
};

fn bench_typewriter_tick(c: &mut Criterion) {
    c.bench_function("typewriter_tick", |b| {
        let mut machine = Typewriter::new("Khalid Jamil", 120, 1200);
        b.iter(|| black_box(machine.tick()))
    });
}

fn bench_typewriter_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("typewriter_cycle");

    for len in [8, 64, 512].iter() {
        let text: String = "abcdefgh".chars().cycle().take(*len).collect();
        group.bench_with_input(BenchmarkId::new("chars", len), &text, |b, text| {
            b.iter(|| {
                let mut machine = Typewriter::new(text, 120, 1200);
                // grow + pause + shrink + pause
                for _ in 0..(2 * text.len() + 2) {
                    black_box(machine.tick());
                }
            })
        });
    }

    group.finish();
}

fn bench_typewriter_scheduled(c: &mut Criterion) {
    c.bench_function("typewriter_scheduled_cycle", |b| {
        b.iter(|| {
            let page = Rc::new(MemoryPage::default());
            page.append(ElementSpec::new("span").with_id("typingName"));
            let clock = ManualScheduler::new();
            let config = TypewriterConfig::default();
            let handle = Typewriter::start(&config, page.clone(), Rc::new(clock.clone()));
            clock.advance(5_000);
            handle.cancel();
        })
    });
}

fn page_with_cards(count: usize) -> Rc<MemoryPage> {
    let page = Rc::new(MemoryPage::new(1280.0, 800.0));
    for i in 0..count {
        page.append(
            ElementSpec::new("div")
                .with_class("project-card")
                .with_layout(i as f64 * 120.0, 100.0)
                .with_columns(0.0, 400.0),
        );
    }
    page
}

fn bench_animator_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("animator_evaluate");

    for count in [10, 100, 500].iter() {
        let page = page_with_cards(*count);
        let nodes = page.query_selector_all(".project-card");
        let margin = RootMargin::parse("0px 0px -50px 0px").unwrap();

        group.bench_with_input(BenchmarkId::new("elements", count), &nodes, |b, nodes| {
            b.iter(|| {
                let mut animator = VisibilityAnimator::new(0.1, margin, |_| {}).unwrap();
                animator.observe_all(nodes.iter().copied());
                black_box(animator.evaluate(page.as_ref()))
            })
        });
    }

    group.finish();
}

fn bench_query_selector(c: &mut Criterion) {
    let page = page_with_cards(200);
    c.bench_function("query_selector_all_list", |b| {
        b.iter(|| {
            black_box(page.query_selector_all(
                ".highlight-card, .skill-category, .project-card, .education-item",
            ))
        })
    });
}

fn bench_validate(c: &mut Criterion) {
    let valid = ContactSubmission::new(
        "Ada Lovelace",
        "ada@example.com",
        "Engines",
        "Let us talk about the analytical engine.",
    );
    let invalid = ContactSubmission::new("Ada", "ada@@example", "Engines", "Hello there!");

    c.bench_function("validate_valid", |b| b.iter(|| black_box(valid.validate())));
    c.bench_function("validate_invalid_email", |b| {
        b.iter(|| black_box(invalid.validate()))
    });
}

criterion_group!(
    benches,
    bench_typewriter_tick,
    bench_typewriter_cycle,
    bench_typewriter_scheduled,
    bench_animator_evaluate,
    bench_query_selector,
    bench_validate,
);
criterion_main!(benches);
