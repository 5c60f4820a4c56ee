use chatmark_core::theme::Theme;
use chatmark_markdown::options::MarkdownRenderOptions;
use chatmark_markdown::options::MarkdownStyles;
use chatmark_markdown::render_markdown;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

#[derive(Clone, Debug)]
struct GoldenCase {
    name: &'static str,
    fixture: &'static str,
    options: MarkdownRenderOptions,
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn golden_path(case: &GoldenCase) -> PathBuf {
    fixtures_dir()
        .join("golden")
        .join(format!("{}__{}.txt", case.fixture, case.name))
}

fn normalize(s: &str) -> String {
    let mut out = String::new();
    for (i, line) in s.replace("\r\n", "\n").split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.trim_end());
    }
    out.trim_end_matches('\n').to_string()
}

fn render(case: &GoldenCase) -> String {
    let md = fs::read_to_string(fixtures_dir().join(format!("{}.md", case.fixture)))
        .expect("read fixture");
    let styles = MarkdownStyles::from_theme(&Theme::plain());
    normalize(&render_markdown(&md, &styles, &case.options).plain_text())
}

fn update_goldens_enabled() -> bool {
    matches!(
        std::env::var("UPDATE_GOLDENS").as_deref(),
        Ok("1" | "true" | "yes")
    )
}

fn check_golden(case: GoldenCase) {
    let got = render(&case);
    let path = golden_path(&case);

    if update_goldens_enabled() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create golden dir");
        }
        fs::write(&path, format!("{got}\n")).expect("write golden");
        return;
    }

    let expected = fs::read_to_string(&path).unwrap_or_else(|_| {
        panic!(
            "missing golden file: {}\nRun: UPDATE_GOLDENS=1 cargo test -p chatmark-markdown golden",
            path.display()
        )
    });
    let expected = normalize(&expected);
    assert_eq!(
        got,
        expected,
        "golden mismatch: {}\nRun: UPDATE_GOLDENS=1 cargo test -p chatmark-markdown golden",
        path.display()
    );
}

#[test]
fn golden_chat_sample_default() {
    check_golden(GoldenCase {
        name: "default",
        fixture: "chat_sample",
        options: MarkdownRenderOptions::default(),
    });
}

#[test]
fn golden_chat_sample_compact() {
    check_golden(GoldenCase {
        name: "compact",
        fixture: "chat_sample",
        options: MarkdownRenderOptions {
            number_ordered_lists: true,
            blockquote_prefix: "> ".to_string(),
            code_block_indent: 2,
            rule_width: 10,
            ..MarkdownRenderOptions::default()
        },
    });
}
