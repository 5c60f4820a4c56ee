//! Markdown source to token tree.
//!
//! The tokenizer folds the `pulldown-cmark` event stream into an immutable tree of [`Token`]s.
//! Constructs the renderer has no dedicated node for (tables, footnote definitions, HTML, images)
//! are kept as [`TokenKind::Unrecognized`] tokens carrying literal text, so nothing in the source
//! is silently lost.

use crate::error::ParseError;
use crate::error::Result;
use crate::options::ParseOptions;
use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::CowStr;
use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use std::ops::Range;
use std::panic::AssertUnwindSafe;
use tracing::debug;
use tracing::trace;
use url::Url;

/// The closed set of token types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    /// `depth` is 1..=6.
    Heading {
        depth: u8,
    },
    Paragraph,
    CodeBlock {
        language: Option<String>,
    },
    CodeSpan,
    /// `items` holds [`TokenKind::ListItem`] tokens in source order.
    List {
        ordered: bool,
        start: Option<u64>,
        items: Vec<Token>,
    },
    /// `checked` is set for task list items.
    ListItem {
        checked: Option<bool>,
    },
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        href: Option<String>,
        title: Option<String>,
    },
    LineBreak,
    HorizontalRule,
    BlockQuote,
    /// Blank space between blocks. Never produced by [`tokenize`], accepted from hand-built trees.
    Space,
    /// Any construct without a dedicated node. Carries the construct name (`"table"`, `"html"`, ...).
    Unrecognized(String),
}

impl TokenKind {
    pub fn name(&self) -> &str {
        match self {
            TokenKind::Text => "text",
            TokenKind::Heading { .. } => "heading",
            TokenKind::Paragraph => "paragraph",
            TokenKind::CodeBlock { .. } => "code-block",
            TokenKind::CodeSpan => "code-span",
            TokenKind::List { .. } => "list",
            TokenKind::ListItem { .. } => "list-item",
            TokenKind::Emphasis => "emphasis",
            TokenKind::Strong => "strong",
            TokenKind::Strikethrough => "strikethrough",
            TokenKind::Link { .. } => "link",
            TokenKind::LineBreak => "line-break",
            TokenKind::HorizontalRule => "horizontal-rule",
            TokenKind::BlockQuote => "block-quote",
            TokenKind::Space => "space",
            TokenKind::Unrecognized(name) => name,
        }
    }
}

/// A node of the parsed markdown tree.
///
/// Both `text` and `children` are optional; renderers treat a missing value as empty content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Option<String>,
    pub children: Option<Vec<Token>>,
}

impl Token {
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            text: None,
            children: None,
        }
    }

    /// A [`TokenKind::Text`] token.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::with_text(TokenKind::Text, text)
    }

    pub fn with_text(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: Some(text.into()),
            children: None,
        }
    }

    pub fn with_children(kind: TokenKind, children: Vec<Token>) -> Self {
        Self {
            kind,
            text: None,
            children: Some(children),
        }
    }

    /// Child tokens, or an empty slice when the token declares none.
    pub fn children(&self) -> &[Token] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Concatenated literal text of this token and all of its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        push_plain_text(&mut out, std::slice::from_ref(self));
        out
    }
}

fn push_plain_text(out: &mut String, tokens: &[Token]) {
    for t in tokens {
        match &t.kind {
            TokenKind::LineBreak => out.push('\n'),
            TokenKind::List { items, .. } => push_plain_text(out, items),
            _ => {
                out.push_str(t.text_or_empty());
                push_plain_text(out, t.children());
            }
        }
    }
}

/// Ordered top-level tokens of one markdown source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenTree {
    tokens: Vec<Token>,
}

impl TokenTree {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Parses `source` into a [`TokenTree`].
///
/// Fails only when the source is over `max_input_bytes` or the underlying parser panics.
/// Malformed markdown (unclosed emphasis, stray fences, ...) tokenizes to best-effort text, and
/// containers nested past `max_nesting_depth` keep their content as literal text.
pub fn tokenize(source: &str, options: &ParseOptions) -> Result<TokenTree> {
    if let Some(limit) = options.max_input_bytes
        && source.len() > limit
    {
        return Err(ParseError::InputTooLarge {
            len: source.len(),
            limit,
        });
    }

    let tree = std::panic::catch_unwind(AssertUnwindSafe(|| build_tree(source, options)))
        .map_err(|payload| ParseError::Panicked(panic_message(payload.as_ref())))?;
    trace!(tokens = tree.len(), bytes = source.len(), "tokenized markdown");
    Ok(tree)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn build_tree(source: &str, options: &ParseOptions) -> TokenTree {
    let mut parser_options = Options::empty();
    parser_options.insert(Options::ENABLE_TABLES);
    parser_options.insert(Options::ENABLE_TASKLISTS);
    parser_options.insert(Options::ENABLE_FOOTNOTES);
    parser_options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(source, parser_options).into_offset_iter();

    let mut b = TreeBuilder::new(source, options);
    for (event, range) in parser {
        b.handle(event, range);
    }
    b.finish()
}

#[derive(Debug)]
enum FrameKind {
    Token(TokenKind),
    CodeBlock {
        language: Option<String>,
    },
    Image,
    /// Everything inside is dropped; the token keeps the raw source slice instead.
    Raw {
        name: &'static str,
        source: String,
        depth: usize,
    },
    /// A container opened past `max_nesting_depth`. Its content is kept as literal text only.
    Flattened {
        text: String,
        depth: usize,
    },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<Token>,
}

struct TreeBuilder<'a> {
    source: &'a str,
    options: &'a ParseOptions,
    stack: Vec<Frame>,
    top: Vec<Token>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, options: &'a ParseOptions) -> Self {
        Self {
            source,
            options,
            stack: Vec::new(),
            top: Vec::new(),
        }
    }

    fn handle(&mut self, event: Event<'_>, range: Range<usize>) {
        let absorbed = match self.stack.last_mut().map(|f| &mut f.kind) {
            Some(FrameKind::Raw { depth, .. }) => Some(ends_frame(depth, &event)),
            Some(FrameKind::Flattened { text, depth }) => {
                push_flat_text(text, &event);
                Some(ends_frame(depth, &event))
            }
            _ => None,
        };
        if let Some(close) = absorbed {
            if close {
                self.close();
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(_) => self.close(),
            Event::Text(text) => self.push(Token::plain(text.to_string())),
            Event::Code(text) => self.push(Token::with_text(TokenKind::CodeSpan, text.to_string())),
            Event::Html(html) | Event::InlineHtml(html) => {
                debug!("keeping inline html as literal text");
                self.push(Token::with_text(
                    TokenKind::Unrecognized("html".to_string()),
                    html.to_string(),
                ));
            }
            Event::FootnoteReference(label) => self.push(Token::with_text(
                TokenKind::Unrecognized("footnote-reference".to_string()),
                format!("[^{label}]"),
            )),
            Event::SoftBreak => {
                if self.options.preserve_new_lines {
                    self.push(Token::new(TokenKind::LineBreak));
                } else {
                    self.push(Token::plain(" "));
                }
            }
            Event::HardBreak => self.push(Token::new(TokenKind::LineBreak)),
            Event::Rule => self.push(Token::new(TokenKind::HorizontalRule)),
            Event::TaskListMarker(checked) => self.mark_task(checked),
            #[allow(unreachable_patterns)]
            other => debug!(event = ?other, "ignoring markdown event"),
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Token(TokenKind::Paragraph),
            Tag::Heading { level, .. } => FrameKind::Token(TokenKind::Heading {
                depth: heading_level(level),
            }),
            Tag::BlockQuote(_) => FrameKind::Token(TokenKind::BlockQuote),
            Tag::CodeBlock(kind) => FrameKind::CodeBlock {
                language: match kind {
                    CodeBlockKind::Fenced(lang) => normalize_fenced_lang(&lang),
                    CodeBlockKind::Indented => None,
                },
            },
            Tag::List(start) => FrameKind::Token(TokenKind::List {
                ordered: start.is_some(),
                start,
                items: Vec::new(),
            }),
            Tag::Item => FrameKind::Token(TokenKind::ListItem { checked: None }),
            Tag::Emphasis => FrameKind::Token(TokenKind::Emphasis),
            Tag::Strong => FrameKind::Token(TokenKind::Strong),
            Tag::Strikethrough => FrameKind::Token(TokenKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => {
                let href = resolve_url(self.options.base_url.as_deref(), &dest_url);
                FrameKind::Token(TokenKind::Link {
                    href: (!href.is_empty()).then_some(href),
                    title: (!title.is_empty()).then(|| title.to_string()),
                })
            }
            Tag::Image { .. } => FrameKind::Image,
            Tag::Table(_) => self.raw("table", range),
            Tag::FootnoteDefinition(_) => self.raw("footnote", range),
            Tag::HtmlBlock => self.raw("html", range),
            Tag::MetadataBlock(_) => self.raw("metadata", range),
            #[allow(unreachable_patterns)]
            _ => self.raw("unsupported", range),
        };
        self.open(kind)
    }

    fn raw(&self, name: &'static str, range: Range<usize>) -> FrameKind {
        let source = self
            .source
            .get(range)
            .unwrap_or("")
            .trim_end_matches(['\r', '\n'])
            .to_string();
        FrameKind::Raw {
            name,
            source,
            depth: 0,
        }
    }

    fn open(&mut self, kind: FrameKind) {
        let limit = self.options.max_nesting_depth;
        let kind = if self.stack.len() >= limit {
            debug!(limit, "flattening markdown nested past the limit");
            FrameKind::Flattened {
                text: String::new(),
                depth: 0,
            }
        } else {
            kind
        };
        self.stack.push(Frame {
            kind,
            children: Vec::new(),
        });
    }

    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let token = match frame.kind {
            FrameKind::Token(TokenKind::List { ordered, start, .. }) => {
                Token::new(TokenKind::List {
                    ordered,
                    start,
                    items: frame.children,
                })
            }
            FrameKind::Token(kind) => Token::with_children(kind, frame.children),
            FrameKind::CodeBlock { language } => {
                let mut text: String = frame.children.iter().map(Token::text_or_empty).collect();
                if text.ends_with('\n') {
                    text.pop();
                }
                Token::with_text(TokenKind::CodeBlock { language }, text)
            }
            FrameKind::Image => {
                let mut alt = String::new();
                push_plain_text(&mut alt, &frame.children);
                Token::with_text(TokenKind::Unrecognized("image".to_string()), alt)
            }
            FrameKind::Raw { name, source, .. } => {
                debug!(construct = name, "keeping markdown construct as raw text");
                Token::with_text(TokenKind::Unrecognized(name.to_string()), source)
            }
            FrameKind::Flattened { text, .. } => {
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                if self.in_inline_context() {
                    Token::plain(text)
                } else {
                    Token::with_children(TokenKind::Paragraph, vec![Token::plain(text)])
                }
            }
        };
        self.push(token);
    }

    fn in_inline_context(&self) -> bool {
        matches!(
            self.stack.last().map(|f| &f.kind),
            Some(
                FrameKind::Image
                    | FrameKind::Token(
                        TokenKind::Paragraph
                            | TokenKind::Heading { .. }
                            | TokenKind::Emphasis
                            | TokenKind::Strong
                            | TokenKind::Strikethrough
                            | TokenKind::Link { .. }
                    )
            )
        )
    }

    fn push(&mut self, token: Token) {
        let siblings = match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.top,
        };
        if token.kind == TokenKind::Text
            && let Some(last) = siblings.last_mut()
            && last.kind == TokenKind::Text
            && last.children.is_none()
        {
            last.text
                .get_or_insert_with(String::new)
                .push_str(token.text_or_empty());
            return;
        }
        siblings.push(token);
    }

    fn mark_task(&mut self, checked: bool) {
        let item = self.stack.iter_mut().rev().find_map(|f| match &mut f.kind {
            FrameKind::Token(TokenKind::ListItem { checked: slot }) => Some(slot),
            _ => None,
        });
        if let Some(slot) = item {
            *slot = Some(checked);
        }
    }

    fn finish(mut self) -> TokenTree {
        while !self.stack.is_empty() {
            self.close();
        }
        TokenTree::new(self.top)
    }
}

/// Tracks nesting inside an absorbing frame. Returns `true` on the event that closes it.
fn ends_frame(depth: &mut usize, event: &Event<'_>) -> bool {
    match event {
        Event::Start(_) => {
            *depth += 1;
            false
        }
        Event::End(_) if *depth == 0 => true,
        Event::End(_) => {
            *depth -= 1;
            false
        }
        _ => false,
    }
}

fn push_flat_text(out: &mut String, event: &Event<'_>) {
    match event {
        Event::Text(text) | Event::Code(text) => {
            if out.is_empty() || out.ends_with(' ') {
                out.push_str(text.trim_start());
            } else {
                out.push_str(text);
            }
        }
        Event::SoftBreak | Event::HardBreak | Event::End(_) => {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
        }
        _ => {}
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn normalize_fenced_lang(lang: &CowStr<'_>) -> Option<String> {
    let first = lang.split_whitespace().next().unwrap_or("");
    let first = first.split(',').next().unwrap_or("").trim();
    let first = first.strip_prefix("language-").unwrap_or(first);
    let first = first.trim_start_matches('{').trim_end_matches('}').trim();
    (!first.is_empty()).then(|| first.to_string())
}

fn resolve_url(base_url: Option<&str>, dest: &str) -> String {
    let dest = dest.trim();
    if dest.is_empty() || is_absolute_url(dest) {
        return dest.to_string();
    }
    let Some(base) = base_url.map(str::trim).filter(|s| !s.is_empty()) else {
        return dest.to_string();
    };

    match Url::parse(base) {
        Ok(base) => base
            .join(dest)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| dest.to_string()),
        Err(_) => {
            let dest = dest.trim_start_matches("./").trim_start_matches('/');
            format!("{}/{dest}", base.trim_end_matches('/'))
        }
    }
}

fn is_absolute_url(dest: &str) -> bool {
    dest.starts_with('#')
        || dest.starts_with('/')
        || Url::parse(dest).is_ok_and(|u| !u.cannot_be_a_base() || u.scheme() == "mailto")
}
