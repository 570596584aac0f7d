use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elemental::{attrs, build, children, list, Child, Events};
use elemental_dom::Document;

fn bench_flat(c: &mut Criterion) {
    c.bench_function("build_flat", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            build(
                &mut doc,
                "div",
                (
                    attrs! { "class" => "row", "data-id" => 7 },
                    children!["<b>name</b>", 42, true, list!["a", "b"]],
                ),
            )
            .unwrap()
        })
    });
}

fn bench_nested(c: &mut Criterion) {
    c.bench_function("build_nested_with_sub_events", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            let rows: Vec<Child> = (0..black_box(20))
                .map(|i| {
                    build(&mut doc, "li", children![format!("<span>{}</span>", i)])
                        .map(Child::from)
                        .unwrap()
                })
                .collect();
            build(
                &mut doc,
                "ul",
                (rows, Events::new().sub("li > span", "click", |_, _| {})),
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_flat, bench_nested);
criterion_main!(benches);
