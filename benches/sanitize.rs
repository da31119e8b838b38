use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use wikireader_rs::Sanitizer;

fn synthetic_page(sections: usize) -> String {
    let mut html = String::from("<html><head><style>p{}</style></head><body>");
    for n in 0..sections {
        html.push_str(&format!(
            "<h2>Section {n}<span class=\"mw-editsection\">[edit]</span></h2>\
             <div class=\"hatnote\">See also</div>\
             <p>Paragraph {n} with a citation<sup class=\"reference\">[{n}]</sup>.</p>\
             <ul><li>first</li><li>second</li></ul>\
             <table class=\"infobox\"><tr><td>box</td></tr></table>\
             <table><tr><th>Key</th><td>Value {n}</td></tr></table>"
        ));
    }
    html.push_str("<div class=\"navbox\">nav</div><script>track()</script></body></html>");
    html
}

fn bench_sanitize(c: &mut Criterion) {
    let sanitizer = Sanitizer::default();
    for &sections in &[4usize, 32, 128] {
        let page = synthetic_page(sections);
        c.bench_with_input(BenchmarkId::new("sanitize", sections), &page, |b, page| {
            b.iter(|| black_box(sanitizer.sanitize(page)));
        });
    }
}

criterion_group!(benches, bench_sanitize);
criterion_main!(benches);
