//! Benchmarks do extrator de respostas estruturadas.
//!
//! Testa performance de:
//! - Tags de nome fixo (busca por substring)
//! - Tags indexadas (regex por índice)
//! - Tag repetida (split no fechamento)
//! - Respostas grandes com ruído antes e depois das tags
//!
//! Executar: `cargo bench --bench extract_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use genai_tools::extract::{extract, TagSpec};
use genai_tools::llm::sse::SseDecoder;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HELPERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn resume_response(padding: usize) -> String {
    let filler = "负责核心业务数据分析，搭建指标体系。".repeat(padding);
    format!(
        "<analysis>{f}</analysis>\n<optimization_ideas>{f}</optimization_ideas>\n<optimized_content>{f}</optimized_content>",
        f = filler
    )
}

fn translation_response(padding: usize) -> String {
    let noise = "Here are the translations. ".repeat(padding);
    format!(
        "{n}<translation1>Sign Up</translation1>\n<translation2>Register</translation2>\n<translation3>Create Account</translation3>{n}",
        n = noise
    )
}

fn suggestion_response(count: usize) -> String {
    (0..count)
        .map(|i| format!("<suggestion>回复 {}</suggestion>\n", i))
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_named(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_named");
    let spec = TagSpec::named(["analysis", "optimization_ideas", "optimized_content"]);

    for padding in [1, 50, 500] {
        let raw = resume_response(padding);
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(padding), &raw, |b, raw| {
            b.iter(|| extract(black_box(raw), black_box(&spec)))
        });
    }
    group.finish();
}

fn bench_indexed(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_indexed");
    let spec = TagSpec::indexed("translation", "", 3);

    for padding in [0, 100, 1000] {
        let raw = translation_response(padding);
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(padding), &raw, |b, raw| {
            b.iter(|| extract(black_box(raw), black_box(&spec)))
        });
    }
    group.finish();
}

fn bench_repeated(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_repeated");
    let spec = TagSpec::repeated("suggestion", 3);

    for count in [3, 30, 300] {
        let raw = suggestion_response(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &raw, |b, raw| {
            b.iter(|| extract(black_box(raw), black_box(&spec)))
        });
    }
    group.finish();
}

fn bench_sse_decoder(c: &mut Criterion) {
    let events: String = (0..200)
        .map(|i| format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"片段{}\"}}}}]}}\n\n", i))
        .collect();
    let bytes = events.into_bytes();

    c.bench_function("sse_decoder_64b_chunks", |b| {
        b.iter(|| {
            let mut decoder = SseDecoder::new();
            let mut total = 0;
            for chunk in bytes.chunks(64) {
                total += decoder.push(black_box(chunk)).len();
            }
            total
        })
    });
}

criterion_group!(benches, bench_named, bench_indexed, bench_repeated, bench_sse_decoder);
criterion_main!(benches);
