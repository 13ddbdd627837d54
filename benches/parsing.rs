//! Benchmarks for deck loading and slide rendering.

use std::path::PathBuf;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use termdeck::deck::{self, DeckSource};
use termdeck::render::{ImageCache, RenderLayout, RenderRequest, render_lines};

const SLIDE_SOURCE: &str = "\
---
title: Benchmark Slide
---
# Heading

Some paragraph text that wraps across the content column width.

- first point
- second point

<!-- fragment -->

```rust
fn main() {
    println!(\"hello\");
}
```

> A quote line.

<!-- notes: timing notes -->
";

fn bench_parse_fragments(c: &mut Criterion) {
    let body = "one\n\n<!-- fragment -->\n\ntwo\n\n<!-- fragment -->\n\nthree";
    c.bench_function("parse_fragments", |b| {
        b.iter(|| deck::parse_fragments(black_box(body)))
    });
}

fn bench_render_markdown_slide(c: &mut Criterion) {
    let cache = ImageCache::new(8);
    let request = RenderRequest {
        seq: 0,
        slide_index: 0,
        step: 0,
        body: SLIDE_SOURCE.to_string(),
        slide_dir: PathBuf::from("."),
        layout: RenderLayout::for_viewport(120, 40),
        truecolor: true,
    };
    c.bench_function("render_markdown_slide", |b| {
        b.iter(|| render_lines(black_box(&request), &cache))
    });
}

fn bench_load_directory_deck(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    for n in 1..=20 {
        std::fs::write(dir.path().join(format!("{n:02}_slide.md")), SLIDE_SOURCE).unwrap();
    }
    let source = DeckSource::Directory(dir.path().to_path_buf());
    c.bench_function("load_directory_deck", |b| {
        b.iter(|| deck::load(black_box(&source)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_parse_fragments,
    bench_render_markdown_slide,
    bench_load_directory_deck
);
criterion_main!(benches);
