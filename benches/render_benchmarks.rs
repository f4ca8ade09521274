//! Benchmarks for parsing and rendering templates.
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to record the profiled scopes
//! of splitting, parsing and rendering:
//!
//! ```bash
//! cargo bench --bench render_benchmarks --features profile-with-puffin
//! ```

use bracketed::{Engine, Value};
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn context() -> Value {
    Value::from(json!({
        "user": { "name": "Ada", "langs": ["en", "fr"] },
        "items": [1, 2, 3, 4, 5],
        "price": 19.5,
        "qty": 3
    }))
}

fn render_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("render");
    let engine = Engine::new();
    let ctx = context();

    let templates = [
        ("sole_expression", "{ price * qty }"),
        ("interpolation", "Hello { user.name }, you speak { user.langs.join(' and ') }."),
        (
            "builtins",
            "{ JSON.stringify(items) } { Math.max(1, qty, 2) } { user.name.toUpperCase() }",
        ),
        ("literal_only", "Nothing to evaluate in here at all."),
    ];

    for (name, source) in templates {
        let template = engine.parse(source).unwrap();
        group.bench_function(format!("cached/{name}"), |b| {
            b.iter(|| {
                let value = engine.render(black_box(&template), black_box(&ctx));
                end_profiling_frame();
                black_box(value)
            })
        });
    }

    let source = "{ user.name } bought { qty } for { price * qty }";
    group.bench_function("parse_and_render_uncached", |b| {
        b.iter(|| {
            engine.clear_cache();
            let value = engine.render_str(black_box(source), black_box(&ctx));
            end_profiling_frame();
            black_box(value)
        })
    });

    group.finish();
}

criterion_group!(benches, render_benchmarks);
criterion_main!(benches);
