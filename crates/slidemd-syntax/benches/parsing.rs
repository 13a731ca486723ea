use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use slidemd_syntax::{ParseOptions, parse_with, tokenize};
use std::hint::black_box;

// A slide deck section exercising every extension
fn generate_deck(size_kb: usize) -> String {
    let base = r#"## Chemistry ==basics==

Water is H~2~O and energy is E = mc^2^.
An ==important \=note== with `inline code` and {{literal}}.

<div class="notes">
Speaker notes go here, <b>bold</b> included.
</div>

<!-- a comment > with an angle bracket -->

{#if slide.number > 1}
Previous: {slide.previous}
{/if}

{#each items as item (item.id)}
- {item.name} ~unpaired and ==a==b==c
{/each}

"#;

    let target_bytes = size_kb * 1024;
    let mut content = String::new();
    let mut slide = 0;

    while content.len() < target_bytes {
        content.push_str(&format!("# Slide {}\n\n", slide));
        content.push_str(base);
        slide += 1;
    }

    content
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    for size_kb in [1, 10, 100] {
        let content = generate_deck(size_kb);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("all_extensions", size_kb),
            &content,
            |b, content| b.iter(|| tokenize(black_box(content), &ParseOptions::default())),
        );
        group.bench_with_input(
            BenchmarkId::new("no_extensions", size_kb),
            &content,
            |b, content| b.iter(|| tokenize(black_box(content), &ParseOptions::none())),
        );
    }

    group.finish();
}

fn bench_parse_to_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_to_tree");

    for size_kb in [1, 10, 100] {
        let content = generate_deck(size_kb);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_kb), &content, |b, content| {
            b.iter(|| parse_with(black_box(content), &ParseOptions::default()))
        });
    }

    group.finish();
}

// Unterminated blocks make every `<` and `{` scan to the end of its scope
fn bench_unterminated_blocks(c: &mut Criterion) {
    let content = "<div {#if ".repeat(200);
    c.bench_function("unterminated_blocks", |b| {
        b.iter(|| tokenize(black_box(&content), &ParseOptions::default()))
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse_to_tree,
    bench_unterminated_blocks
);
criterion_main!(benches);
