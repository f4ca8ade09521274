//! Benchmarks for template splitting.
//!
//! Measures the splitter across template shapes and delimiter pairs:
//! - Literal-heavy text with few expressions
//! - Expression-heavy markup
//! - Nested brackets, quotes and regex literals
//! - Multi-character and unequal-length delimiters

use bracketed::{Delimiters, Splitter};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn markup(rows: usize) -> String {
    let mut out = String::from("<table>\n");
    for i in 0..rows {
        out.push_str(&format!(
            "  <tr class=\"{{ rows[{i}].cls }}\"><td>{{ rows[{i}].name }}</td><td>{{ rows[{i}].n / 2 }}</td></tr>\n"
        ));
    }
    out.push_str("</table>\n");
    out
}

fn shape_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("splitter/shapes");
    let delimiters = Delimiters::default();
    let splitter = Splitter::new(&delimiters);

    let prose = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(200);
    group.throughput(Throughput::Bytes(prose.len() as u64));
    group.bench_function("literal_only", |b| {
        b.iter(|| black_box(splitter.segments(black_box(&prose)).map(|s| s.len())))
    });

    let table = markup(100);
    group.throughput(Throughput::Bytes(table.len() as u64));
    group.bench_function("markup_100_rows", |b| {
        b.iter(|| black_box(splitter.segments(black_box(&table)).map(|s| s.len())))
    });

    let tricky = r#"<p a="{ {a: "}", b: [1, {c: '{'}]} }" b="{ /[}{]+/g.test(x) ? x / 2 : y }">"#.repeat(50);
    group.throughput(Throughput::Bytes(tricky.len() as u64));
    group.bench_function("nested_quotes_regex", |b| {
        b.iter(|| black_box(splitter.segments(black_box(&tricky)).map(|s| s.len())))
    });

    group.finish();
}

fn delimiter_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("splitter/delimiters");

    for (name, spec, template) in [
        ("braces", "{ }", "a{ x }b{ {y: 1} }c"),
        ("double_braces", "{{ }}", "a{{ x }}b{{ {y: 1} }}c"),
        ("dollar", "${ }", "a${ x }b${ {y: 1} }c"),
        ("unequal", "[ ]]", "a[ x ]]b[ [y] ]]c"),
    ] {
        let delimiters = Delimiters::parse(Some(spec)).unwrap();
        let source = template.repeat(100);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            let splitter = Splitter::new(&delimiters);
            b.iter(|| black_box(splitter.split(black_box(&source)).map(|s| s.len())))
        });
    }

    group.finish();
}

criterion_group!(benches, shape_benchmarks, delimiter_benchmarks);
criterion_main!(benches);
