//! Top-level render entry points.
//!
//! ## Two layers
//!
//! - [`MarkdownDocument`]: parse once (fallible), render many times.
//! - [`render_markdown`]: parse + render in one call. Never fails: parse errors are logged and
//!   replaced by a single error block, so a malformed chat message cannot take the UI down.
//!
//! ## Minimal example
//!
//! ```rust
//! use chatmark_markdown::document::render_markdown;
//! use chatmark_markdown::options::{MarkdownRenderOptions, MarkdownStyles};
//!
//! let rendered = render_markdown(
//!     "# Hello\n\nSome *markdown*.",
//!     &MarkdownStyles::default(),
//!     &MarkdownRenderOptions::default(),
//! );
//! assert_eq!(rendered.blocks().len(), 2);
//! let text = rendered.to_text();
//! # let _ = text;
//! ```

use crate::block::BlockKind;
use crate::block::BlockNode;
use crate::block::ListRow;
use crate::block::render_blocks;
use crate::error::Result;
use crate::inline::Run;
use crate::inline::runs_to_spans;
use crate::options::MarkdownRenderOptions;
use crate::options::MarkdownStyles;
use crate::options::ParseOptions;
use crate::token::TokenTree;
use crate::token::tokenize;
use chatmark_core::link::LinkAction;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::text::Text;
use tracing::error;
use tracing::trace;
use unicode_width::UnicodeWidthStr;

/// Message shown in place of content that could not be parsed.
pub const ERROR_MESSAGE: &str = "Error rendering Markdown.";

#[derive(Clone, Debug)]
pub struct MarkdownDocument {
    source: String,
    tree: TokenTree,
}

impl MarkdownDocument {
    /// Parses `source` into a token tree.
    pub fn parse(source: impl Into<String>, options: &ParseOptions) -> Result<Self> {
        let source = source.into();
        let tree = tokenize(&source, options)?;
        Ok(Self { source, tree })
    }

    /// Returns the original markdown source (as provided to [`Self::parse`]).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &TokenTree {
        &self.tree
    }

    pub fn render(
        &self,
        styles: &MarkdownStyles,
        options: &MarkdownRenderOptions,
    ) -> RenderedMarkdown {
        let blocks = render_blocks(self.tree.tokens(), styles, options);
        trace!(blocks = blocks.len(), "rendered markdown document");
        RenderedMarkdown {
            blocks,
            layout: TextLayout::from(options),
        }
    }
}

/// Parses and renders `source`.
///
/// This is a total function: on a parse failure it logs the error and returns a root holding a
/// single [`BlockKind::Error`] block with [`ERROR_MESSAGE`].
pub fn render_markdown(
    source: &str,
    styles: &MarkdownStyles,
    options: &MarkdownRenderOptions,
) -> RenderedMarkdown {
    match MarkdownDocument::parse(source, &options.parse) {
        Ok(doc) => doc.render(styles, options),
        Err(err) => {
            error!(error = %err, bytes = source.len(), "failed to render markdown");
            RenderedMarkdown::error(styles, options)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct TextLayout {
    blockquote_prefix: String,
    code_block_indent: u16,
    list_indent: u16,
    rule_width: u16,
}

impl From<&MarkdownRenderOptions> for TextLayout {
    fn from(value: &MarkdownRenderOptions) -> Self {
        Self {
            blockquote_prefix: value.blockquote_prefix.clone(),
            code_block_indent: value.code_block_indent,
            list_indent: value.list_indent,
            rule_width: value.rule_width,
        }
    }
}

/// The root container of a rendered markdown string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMarkdown {
    blocks: Vec<BlockNode>,
    layout: TextLayout,
}

impl RenderedMarkdown {
    fn error(styles: &MarkdownStyles, options: &MarkdownRenderOptions) -> Self {
        Self {
            blocks: vec![BlockNode {
                key: 0,
                style: styles.error,
                kind: BlockKind::Error {
                    message: ERROR_MESSAGE.to_string(),
                },
            }],
            layout: TextLayout::from(options),
        }
    }

    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// `true` when this is the error placeholder produced by [`render_markdown`].
    pub fn is_error(&self) -> bool {
        matches!(
            self.blocks.as_slice(),
            [BlockNode {
                kind: BlockKind::Error { .. },
                ..
            }]
        )
    }

    /// Every pressable link, in document order.
    pub fn links(&self) -> Vec<LinkAction> {
        fn walk(out: &mut Vec<LinkAction>, runs: &[Run]) {
            for run in runs {
                if let Some(action) = run.link_action() {
                    out.push(action);
                }
                walk(out, run.children());
            }
        }

        let mut out = Vec::new();
        for block in &self.blocks {
            for run in block.runs() {
                walk(&mut out, std::slice::from_ref(run));
            }
        }
        out
    }

    /// Materializes the display tree into owned, styled lines.
    pub fn to_lines(&self) -> RenderedText {
        let mut lines: Vec<Line<'static>> = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            self.layout_block(&mut lines, block);
        }

        let content_width = lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| UnicodeWidthStr::width(s.content.as_ref()) as u32)
                    .sum::<u32>()
            })
            .max()
            .unwrap_or(0);
        let content_height = lines.len() as u32;
        RenderedText {
            lines,
            content_width,
            content_height,
        }
    }

    pub fn to_text(&self) -> Text<'static> {
        self.to_lines().into_text()
    }

    /// Plain text of the rendered output, as laid out by [`Self::to_text`].
    pub fn plain_text(&self) -> String {
        self.to_lines()
            .lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn layout_block(&self, lines: &mut Vec<Line<'static>>, block: &BlockNode) {
        match &block.kind {
            BlockKind::Heading { runs, .. } | BlockKind::Paragraph { runs } => {
                push_run_lines(lines, runs, block.style, Vec::new(), &[]);
            }
            BlockKind::CodeBlock { text, .. } => {
                let indent = " ".repeat(self.layout.code_block_indent as usize);
                for line in text.split('\n') {
                    let mut spans = Vec::new();
                    if !indent.is_empty() {
                        spans.push(Span::styled(indent.clone(), block.style));
                    }
                    spans.push(Span::styled(line.to_string(), block.style));
                    lines.push(Line::from(spans));
                }
            }
            BlockKind::List { rows } => {
                for row in rows {
                    self.layout_row(lines, row);
                }
            }
            BlockKind::Rule => {
                let rule = "─".repeat(self.layout.rule_width.max(1) as usize);
                lines.push(Line::from(Span::styled(rule, block.style)));
            }
            BlockKind::BlockQuote { runs } => {
                let prefix = vec![Span::styled(
                    self.layout.blockquote_prefix.clone(),
                    block.style,
                )];
                push_run_lines(lines, runs, block.style, prefix.clone(), &prefix);
            }
            BlockKind::Error { message } => {
                lines.push(Line::from(Span::styled(message.clone(), block.style)));
            }
        }
    }

    fn layout_row(&self, lines: &mut Vec<Line<'static>>, row: &ListRow) {
        let indent = " ".repeat(self.layout.list_indent as usize * row.depth);
        let marker_w = UnicodeWidthStr::width(row.marker.as_str());
        let first = vec![
            Span::raw(indent.clone()),
            Span::styled(row.marker.clone(), row.marker_style),
            Span::raw(" "),
        ];
        let rest = vec![Span::raw(format!("{indent}{}", " ".repeat(marker_w + 1)))];
        push_run_lines(lines, &row.runs, row.style, first, &rest);
    }
}

/// Splits the spans of `runs` at newlines into lines, starting each line with a prefix.
fn push_run_lines(
    lines: &mut Vec<Line<'static>>,
    runs: &[Run],
    base: Style,
    first_prefix: Vec<Span<'static>>,
    rest_prefix: &[Span<'static>],
) {
    let mut current = first_prefix;
    for span in runs_to_spans(runs, base) {
        let style = span.style;
        let content = span.content.into_owned();
        let mut parts = content.split('\n');
        if let Some(head) = parts.next()
            && !head.is_empty()
        {
            current.push(Span::styled(head.to_string(), style));
        }
        for part in parts {
            lines.push(Line::from(std::mem::take(&mut current)));
            current = rest_prefix.to_vec();
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
        }
    }
    lines.push(Line::from(current));
}

/// A chat message laid out as lines, with the size it occupies.
///
/// Hosts use the size to reserve space for a message bubble before drawing it.
#[derive(Clone, Debug)]
pub struct RenderedText {
    pub lines: Vec<Line<'static>>,
    /// Columns taken by the widest line, counting wide characters as two.
    pub content_width: u32,
    /// One row per line, including the blank rows between blocks.
    pub content_height: u32,
}

impl RenderedText {
    pub fn into_text(self) -> Text<'static> {
        Text::from(self.lines)
    }
}
