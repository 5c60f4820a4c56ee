use chatmark_markdown::MarkdownDocument;
use chatmark_markdown::options::MarkdownRenderOptions;
use chatmark_markdown::options::MarkdownStyles;
use chatmark_markdown::render_markdown;
use chatmark_markdown::token::tokenize;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;

fn sample_markdown(code_lines: usize) -> String {
    let mut s = String::new();
    s.push_str("# Performance\n\n");
    s.push_str("This is a long paragraph with *emphasis*, **strong** and `code`. ");
    for _ in 0..12 {
        s.push_str("The quick brown fox jumps over the [lazy dog](https://example.com). ");
    }
    s.push_str("\n\n");

    s.push_str("## List\n\n");
    for i in 0..20 {
        s.push_str(&format!("- item {i} with ~~struck~~ text\n"));
        s.push_str(&format!("  - nested {i}\n"));
    }
    s.push('\n');

    s.push_str("> A quoted reply\n> spanning *two* lines\n\n---\n\n");

    s.push_str("```rs\n");
    s.push_str("fn main() {\n");
    for i in 0..code_lines {
        s.push_str(&format!("    let x{i} = {i} + 1;\n"));
    }
    s.push_str("}\n");
    s.push_str("```\n");
    s
}

fn bench_tokenize(c: &mut Criterion) {
    let md = sample_markdown(200);
    let options = MarkdownRenderOptions::default();
    c.bench_function("markdown/tokenize", |b| {
        b.iter(|| {
            let tree = tokenize(black_box(&md), &options.parse).expect("tokenize");
            black_box(tree.len());
        })
    });
}

fn bench_render_parsed(c: &mut Criterion) {
    let md = sample_markdown(200);
    let styles = MarkdownStyles::default();
    let options = MarkdownRenderOptions::default();
    let doc = MarkdownDocument::parse(md, &options.parse).expect("parse");
    c.bench_function("markdown/render_parsed", |b| {
        b.iter(|| {
            let rendered = doc.render(&styles, &options);
            black_box(rendered.blocks().len());
        })
    });
}

fn bench_render_to_text(c: &mut Criterion) {
    let md = sample_markdown(200);
    let styles = MarkdownStyles::default();
    let options = MarkdownRenderOptions::default();
    c.bench_function("markdown/render_markdown+to_text", |b| {
        b.iter(|| {
            let text = render_markdown(black_box(&md), &styles, &options).to_text();
            black_box(text.lines.len());
        })
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_render_parsed,
    bench_render_to_text
);
criterion_main!(benches);
