use chatmark_markdown::options::MarkdownRenderOptions;
use chatmark_markdown::options::MarkdownStyles;
use chatmark_markdown::options::ParseOptions;
use chatmark_markdown::render_markdown;
use ratatui::text::Line;
use std::env;
use std::fs;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return Ok(());
    }

    let mut rule_width: Option<u16> = None;
    let mut base_url: Option<String> = None;
    let mut number_ordered_lists = false;
    let mut preserve_new_lines = false;
    let mut show_links = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--rule-width" => {
                rule_width = Some(parse_u16(&args, &mut i, "--rule-width")?);
            }
            "--base-url" => {
                base_url = Some(parse_string(&args, &mut i, "--base-url")?);
            }
            "--number-ordered-lists" => {
                number_ordered_lists = true;
                i += 1;
            }
            "--preserve-new-lines" => {
                preserve_new_lines = true;
                i += 1;
            }
            "--links" => {
                show_links = true;
                i += 1;
            }
            _ => break,
        }
    }

    let input = if i < args.len() {
        fs::read_to_string(&args[i])?
    } else {
        let mut s = String::new();
        io::stdin().read_to_string(&mut s)?;
        s
    };

    // Fall back to the terminal width when stdout is a tty.
    let rule_width = rule_width
        .or_else(|| crossterm::terminal::size().ok().map(|(w, _)| w))
        .unwrap_or(40);

    let options = MarkdownRenderOptions {
        parse: ParseOptions {
            preserve_new_lines,
            base_url,
            ..ParseOptions::default()
        },
        number_ordered_lists,
        rule_width,
        ..MarkdownRenderOptions::default()
    };
    let rendered = render_markdown(&input, &MarkdownStyles::default(), &options);

    for line in rendered.to_text().lines {
        println!("{}", line_to_plain(&line));
    }

    if show_links {
        println!();
        for (n, link) in rendered.links().iter().enumerate() {
            println!("[{}] {} -> {}", n + 1, link.label, link.href);
        }
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        "Usage: dump [options] [path]\n\
\n\
Options:\n\
  --rule-width <n>            Width of horizontal rules (default: terminal width)\n\
  --base-url <url>            Resolve relative links against this base\n\
  --number-ordered-lists      Use 1. 2. 3. markers for ordered lists\n\
  --preserve-new-lines        Keep soft line breaks\n\
  --links                     List link destinations after the output\n\
  -h, --help                  Show this help\n\
\n\
If [path] is omitted, reads Markdown from stdin.\n\
Set RUST_LOG=chatmark_markdown=debug to see tokenizer diagnostics."
    );
}

fn parse_u16(args: &[String], i: &mut usize, flag: &str) -> io::Result<u16> {
    let Some(v) = args.get(*i + 1) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} expects a value"),
        ));
    };
    *i += 2;
    v.parse::<u16>().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} invalid u16: {e}"),
        )
    })
}

fn parse_string(args: &[String], i: &mut usize, flag: &str) -> io::Result<String> {
    let Some(v) = args.get(*i + 1) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} expects a value"),
        ));
    };
    *i += 2;
    Ok(v.to_string())
}

fn line_to_plain(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}
