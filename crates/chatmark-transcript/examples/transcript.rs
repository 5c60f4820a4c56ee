use chatmark_core::theme::Theme;
use chatmark_transcript::transcript::ChatMessage;
use chatmark_transcript::transcript::TranscriptOptions;
use chatmark_transcript::transcript::TranscriptStyles;
use chatmark_transcript::transcript::chat_title;
use chatmark_transcript::transcript::render_transcript;
use chatmark_transcript::transcript::transcript_text;
use std::io;
use tracing_subscriber::EnvFilter;

const ANSWER: &str = "# Rendering Markdown\n\n\
Here is a short answer with *emphasis*, **strong** text and `inline code`.\n\n\
1. Parse the message\n\
2. Render each block\n\
   - [x] headings\n\
   - [ ] tables\n\n\
> Quoted context\n> over two lines\n\n\
```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\n\
---\n\n\
[Click here to open Google](https://www.google.com)";

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let messages = vec![
        ChatMessage::user("How would a terminal chat client render markdown answers?"),
        ChatMessage::assistant(ANSWER),
    ];

    let styles = TranscriptStyles::from_theme(&Theme::plain());
    let rendered = render_transcript(&messages, &styles, &TranscriptOptions::default());

    if let Some(first) = messages.first() {
        println!("== {} ==\n", chat_title(&first.content));
    }
    for line in transcript_text(&rendered, &styles).lines {
        let plain: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        println!("{}", plain.trim_end());
    }

    let links: Vec<_> = rendered.iter().flat_map(|m| m.links()).collect();
    if !links.is_empty() {
        println!();
        for (n, link) in links.iter().enumerate() {
            println!("[{}] {} -> {}", n + 1, link.label, link.href);
        }
    }
    Ok(())
}
