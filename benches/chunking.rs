use criterion::{Criterion, criterion_group, criterion_main};
use nutrition_rag::chunking::{ChunkingConfig, split_text};
use std::hint::black_box;

fn synthetic_guideline_text() -> String {
    let paragraph = "Adults with elevated blood pressure should follow an eating plan rich in \
vegetables, fruits, whole grains, and low-fat dairy. Reduce sodium intake toward 1500 mg per day. \
Limit saturated fat to less than 6% of daily calories and avoid sugar-sweetened beverages. \
Regular physical activity and weight management amplify the dietary effect.";

    let mut text = String::new();
    for i in 0..200 {
        text.push_str(&format!("Section {}\n\n{}\n\n", i, paragraph));
    }
    text
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let text = synthetic_guideline_text();
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| split_text(black_box(&text), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
