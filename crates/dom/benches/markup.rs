use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elemental_dom::{Document, InsertPosition};

const SNIPPET: &str = "<ul class=\"list\"><li data-id=1>one &amp; two</li><li data-id=2><b>three</b></li>\
<li data-id=3><a href=\"/x\">four</a></li></ul>";

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert_adjacent_html_unescaped", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            let root = doc.create_element("div").unwrap();
            doc.insert_adjacent_html_unescaped(root, InsertPosition::BeforeEnd, black_box(SNIPPET))
                .unwrap();
            root
        })
    });
}

fn bench_query(c: &mut Criterion) {
    let mut doc = Document::new();
    let root = doc.create_element("div").unwrap();
    for _ in 0..50 {
        doc.insert_adjacent_html_unescaped(root, InsertPosition::BeforeEnd, SNIPPET)
            .unwrap();
    }

    c.bench_function("query_selector_all", |b| {
        b.iter(|| doc.query_selector_all(root, black_box("ul.list > li[data-id] a")).unwrap())
    });
}

criterion_group!(benches, bench_insert, bench_query);
criterion_main!(benches);
