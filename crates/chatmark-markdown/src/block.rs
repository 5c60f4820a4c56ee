use crate::inline::Run;
use crate::inline::RunKind;
use crate::inline::append_runs;
use crate::inline::render_inline;
use crate::options::MarkdownRenderOptions;
use crate::options::MarkdownStyles;
use crate::token::Token;
use crate::token::TokenKind;
use ratatui::style::Style;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Heading { level: u8, runs: Vec<Run> },
    Paragraph { runs: Vec<Run> },
    /// `text` is the verbatim code; it is never interpreted as markdown.
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    List { rows: Vec<ListRow> },
    Rule,
    BlockQuote { runs: Vec<Run> },
    Error { message: String },
}

/// A block-level display node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockNode {
    /// Position of this block within the rendered document.
    pub key: usize,
    pub style: Style,
    pub kind: BlockKind,
}

impl BlockNode {
    /// All inline runs owned by this block, in document order.
    pub fn runs(&self) -> Vec<&Run> {
        match &self.kind {
            BlockKind::Heading { runs, .. }
            | BlockKind::Paragraph { runs }
            | BlockKind::BlockQuote { runs } => runs.iter().collect(),
            BlockKind::List { rows } => rows.iter().flat_map(|r| r.runs.iter()).collect(),
            BlockKind::CodeBlock { .. } | BlockKind::Rule | BlockKind::Error { .. } => Vec::new(),
        }
    }
}

/// One row of a rendered list: a marker followed by the item's inline content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRow {
    pub key: usize,
    /// Nesting level, 0 for top-level items.
    pub depth: usize,
    pub marker: String,
    pub marker_style: Style,
    pub style: Style,
    pub runs: Vec<Run>,
}

/// Renders top-level block tokens into display nodes.
///
/// `Space` tokens and stray line breaks render as nothing. Tokens without a dedicated block
/// rendering fall back to a paragraph of their children, then of their literal text.
pub fn render_blocks(
    tokens: &[Token],
    styles: &MarkdownStyles,
    options: &MarkdownRenderOptions,
) -> Vec<BlockNode> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some((style, kind)) = render_block(token, styles, options) {
            let key = out.len();
            out.push(BlockNode { key, style, kind });
        }
    }
    out
}

fn render_block(
    token: &Token,
    styles: &MarkdownStyles,
    options: &MarkdownRenderOptions,
) -> Option<(Style, BlockKind)> {
    let block = match &token.kind {
        TokenKind::Heading { depth } => (
            styles.heading(*depth),
            BlockKind::Heading {
                level: *depth,
                runs: render_inline(token.children.as_deref(), styles),
            },
        ),
        TokenKind::Paragraph => (
            styles.paragraph,
            BlockKind::Paragraph {
                runs: render_inline(token.children.as_deref(), styles),
            },
        ),
        TokenKind::CodeBlock { language } => (
            styles.code_block,
            BlockKind::CodeBlock {
                language: language.clone(),
                text: token.text_or_empty().to_string(),
            },
        ),
        TokenKind::List {
            ordered,
            start,
            items,
        } => {
            let mut rows = Vec::new();
            let list = ListCtx {
                ordered: *ordered,
                start: *start,
                depth: 0,
            };
            push_list_rows(&mut rows, items, list, styles, options);
            (Style::default(), BlockKind::List { rows })
        }
        TokenKind::HorizontalRule => (styles.rule, BlockKind::Rule),
        TokenKind::BlockQuote => (
            styles.blockquote,
            BlockKind::BlockQuote {
                runs: flow_runs(token.children(), styles, options),
            },
        ),
        TokenKind::Space | TokenKind::LineBreak => return None,
        TokenKind::Text
        | TokenKind::CodeSpan
        | TokenKind::ListItem { .. }
        | TokenKind::Emphasis
        | TokenKind::Strong
        | TokenKind::Strikethrough
        | TokenKind::Link { .. }
        | TokenKind::Unrecognized(_) => return fallback_block(token, styles),
    };
    Some(block)
}

fn fallback_block(token: &Token, styles: &MarkdownStyles) -> Option<(Style, BlockKind)> {
    debug!(kind = token.kind.name(), "rendering token through paragraph fallback");
    let runs = if let Some(children) = token.children.as_deref() {
        render_inline(Some(children), styles)
    } else {
        vec![Run::text(0, Style::default(), token.text.clone()?)]
    };
    Some((styles.paragraph, BlockKind::Paragraph { runs }))
}

#[derive(Clone, Copy, Debug)]
struct ListCtx {
    ordered: bool,
    start: Option<u64>,
    depth: usize,
}

fn push_list_rows(
    rows: &mut Vec<ListRow>,
    items: &[Token],
    list: ListCtx,
    styles: &MarkdownStyles,
    options: &MarkdownRenderOptions,
) {
    let mut number = list.start.unwrap_or(1);
    for item in items {
        let marker = match &item.kind {
            TokenKind::ListItem {
                checked: Some(true),
            } => "[✓]".to_string(),
            TokenKind::ListItem {
                checked: Some(false),
            } => "[ ]".to_string(),
            _ if list.ordered && options.number_ordered_lists => format!("{number}."),
            _ => options.bullet.clone(),
        };
        number = number.saturating_add(1);

        // Content after a nested list continues under a blank marker of the same width.
        let continuation = " ".repeat(UnicodeWidthStr::width(marker.as_str()));
        let mut marker = Some(marker);
        let mut pending: Vec<&Token> = Vec::new();
        for child in item.children() {
            if let TokenKind::List {
                ordered,
                start,
                items,
            } = &child.kind
            {
                if !pending.is_empty() || marker.is_some() {
                    let m = marker.take().unwrap_or_else(|| continuation.clone());
                    push_row(rows, list.depth, m, &pending, styles, options);
                    pending.clear();
                }
                let nested = ListCtx {
                    ordered: *ordered,
                    start: *start,
                    depth: list.depth + 1,
                };
                push_list_rows(rows, items, nested, styles, options);
            } else {
                pending.push(child);
            }
        }
        if !pending.is_empty() || marker.is_some() {
            let m = marker.unwrap_or(continuation);
            push_row(rows, list.depth, m, &pending, styles, options);
        }
    }
}

fn push_row(
    rows: &mut Vec<ListRow>,
    depth: usize,
    marker: String,
    content: &[&Token],
    styles: &MarkdownStyles,
    options: &MarkdownRenderOptions,
) {
    let key = rows.len();
    rows.push(ListRow {
        key,
        depth,
        marker,
        marker_style: styles.bullet,
        style: styles.list_item,
        runs: flow_runs(content.iter().copied(), styles, options),
    });
}

/// Flattens the content of a container (list item, block quote) into a single run sequence.
///
/// Inline tokens render in place; nested blocks start on a new line and contribute their inline
/// content. Keys are positions in the flattened sequence.
fn flow_runs<'t>(
    tokens: impl IntoIterator<Item = &'t Token>,
    styles: &MarkdownStyles,
    options: &MarkdownRenderOptions,
) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::new();
    let mut needs_break = false;
    for token in tokens {
        match &token.kind {
            TokenKind::Paragraph
            | TokenKind::Heading { .. }
            | TokenKind::BlockQuote
            | TokenKind::ListItem { .. } => {
                start_line(&mut out);
                let runs = flow_runs(token.children(), styles, options);
                append_runs(&mut out, runs);
                needs_break = true;
            }
            TokenKind::CodeBlock { .. } => {
                start_line(&mut out);
                let code = Run::text(0, styles.code_inline, token.text_or_empty());
                append_runs(&mut out, vec![code]);
                needs_break = true;
            }
            TokenKind::List { items, .. } => {
                for item in items {
                    start_line(&mut out);
                    let marker = Run::text(0, styles.bullet, format!("{} ", options.bullet));
                    append_runs(&mut out, vec![marker]);
                    let runs = flow_runs(item.children(), styles, options);
                    append_runs(&mut out, runs);
                }
                needs_break = true;
            }
            TokenKind::HorizontalRule | TokenKind::Space => needs_break = true,
            TokenKind::Text
            | TokenKind::CodeSpan
            | TokenKind::Emphasis
            | TokenKind::Strong
            | TokenKind::Strikethrough
            | TokenKind::Link { .. }
            | TokenKind::LineBreak
            | TokenKind::Unrecognized(_) => {
                if needs_break {
                    start_line(&mut out);
                    needs_break = false;
                }
                let runs = render_inline(Some(std::slice::from_ref(token)), styles);
                append_runs(&mut out, runs);
            }
        }
    }
    out
}

fn start_line(out: &mut Vec<Run>) {
    let at_line_start = match out.last().map(|r| &r.kind) {
        None => true,
        Some(RunKind::Text(t)) => t.ends_with('\n'),
        Some(_) => false,
    };
    if !at_line_start {
        append_runs(out, vec![Run::text(0, Style::default(), "\n")]);
    }
}
