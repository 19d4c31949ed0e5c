use autohint::{
    detect, fontinfo, synth, FontHinter, GlyphMetrics, GlyphOutline, GlyphSource,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sources() -> Vec<GlyphSource> {
    hint_test_data::bez::ALL
        .iter()
        .map(|(name, text)| GlyphSource::Bez {
            name: name.to_string(),
            metrics: GlyphMetrics::default(),
            text: text.to_string(),
        })
        .collect()
}

fn outlines() -> Vec<GlyphOutline> {
    hint_test_data::bez::ALL
        .iter()
        .filter_map(|(name, text)| {
            autohint::outline::bez::read(*name, text, GlyphMetrics::default()).ok()
        })
        .collect()
}

pub fn hint_font(c: &mut Criterion) {
    let metrics = fontinfo::parse(hint_test_data::fontinfo::SANS).unwrap();
    let hinter = FontHinter::from_metrics(metrics.clone());

    c.bench_function("run", |b| {
        b.iter(|| {
            let font = hinter.run(sources()).unwrap();
            black_box(font.writer().unwrap().charstrings().unwrap());
        })
    });

    let outlines = outlines();
    let config = metrics.config();
    c.bench_function("detect_and_synthesize", |b| {
        b.iter(|| {
            for outline in &outlines {
                let features = detect::detect(outline, &config, &metrics);
                black_box(synth::synthesize(outline, &features, &config, &metrics));
            }
        })
    });
}

criterion_group!(benches, hint_font);
criterion_main!(benches);
