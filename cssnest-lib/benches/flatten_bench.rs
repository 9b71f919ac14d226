extern crate criterion;

use criterion::{criterion_group, criterion_main, Criterion};

use cssnest_lib::{flatten, SheetOptions, Style};

fn bench_wide_sheet(c: &mut Criterion) {
    let mut styles = Style::new();
    for i in 0..10_000 {
        styles = styles.nest(
            &format!("rule{}", i),
            Style::new()
                .set("color", "red")
                .nest("&:hover", Style::new().set("color", "blue"))
                .nest("@media print", Style::new().set("color", "black")),
        );
    }

    c.bench_function("wide_sheet", |b| {
        b.iter(|| flatten(styles.clone(), SheetOptions::default()))
    });
}

fn bench_deep_nesting(c: &mut Criterion) {
    let mut deep = Style::new().set("color", "red");
    for i in 0..200 {
        deep = Style::new()
            .set("margin", i)
            .nest(&format!("& > .level{}", i), deep);
    }
    let styles = Style::new().nest(".root", deep);

    c.bench_function("deep_nesting", |b| {
        b.iter(|| flatten(styles.clone(), SheetOptions::default()))
    });
}

criterion_group!(benches, bench_wide_sheet, bench_deep_nesting);
criterion_main!(benches);
