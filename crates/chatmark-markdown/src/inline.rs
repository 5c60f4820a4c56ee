use crate::options::MarkdownStyles;
use crate::token::Token;
use crate::token::TokenKind;
use chatmark_core::link::LinkAction;
use chatmark_core::link::UrlOpener;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunKind {
    Text(String),
    /// A wrapper whose style applies to every child run.
    Styled(Vec<Run>),
    /// A pressable wrapper; activating it opens `href`.
    Link { href: String, children: Vec<Run> },
}

/// An inline display primitive.
///
/// `style` is the run's own contribution. The effective style of a run is its parent's effective
/// style patched with `style`, so nested emphasis composes (bold inside italic is both).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    /// Position of this run within its sibling sequence.
    pub key: usize,
    pub style: Style,
    pub kind: RunKind,
}

impl Run {
    pub fn text(key: usize, style: Style, text: impl Into<String>) -> Self {
        Self {
            key,
            style,
            kind: RunKind::Text(text.into()),
        }
    }

    pub fn children(&self) -> &[Run] {
        match &self.kind {
            RunKind::Text(_) => &[],
            RunKind::Styled(children) | RunKind::Link { children, .. } => children,
        }
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        push_plain(&mut out, std::slice::from_ref(self));
        out
    }

    pub fn link_action(&self) -> Option<LinkAction> {
        match &self.kind {
            RunKind::Link { href, .. } => Some(LinkAction::new(href.clone(), self.plain_text())),
            _ => None,
        }
    }

    /// Opens this run's destination if it is a link. Returns `false` for inert runs.
    pub fn activate(&self, opener: &dyn UrlOpener) -> bool {
        match &self.kind {
            RunKind::Link { href, .. } => {
                opener.open(href);
                true
            }
            _ => false,
        }
    }
}

fn push_plain(out: &mut String, runs: &[Run]) {
    for run in runs {
        match &run.kind {
            RunKind::Text(text) => out.push_str(text),
            RunKind::Styled(children) | RunKind::Link { children, .. } => {
                push_plain(out, children)
            }
        }
    }
}

/// Renders a sequence of inline tokens into runs.
///
/// A missing sequence renders as nothing. Tokens that are not inline formatting contribute their
/// literal `text`, if any.
pub fn render_inline(tokens: Option<&[Token]>, styles: &MarkdownStyles) -> Vec<Run> {
    let Some(tokens) = tokens else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some((style, kind)) = inline_run(token, styles) {
            let key = out.len();
            out.push(Run { key, style, kind });
        }
    }
    out
}

fn inline_run(token: &Token, styles: &MarkdownStyles) -> Option<(Style, RunKind)> {
    let children = || render_inline(token.children.as_deref(), styles);
    let run = match &token.kind {
        TokenKind::Text => (
            Style::default(),
            RunKind::Text(token.text_or_empty().to_string()),
        ),
        TokenKind::CodeSpan => (
            styles.code_inline,
            RunKind::Text(token.text_or_empty().to_string()),
        ),
        TokenKind::Emphasis => (
            Style::default().add_modifier(Modifier::ITALIC),
            RunKind::Styled(children()),
        ),
        TokenKind::Strong => (
            Style::default().add_modifier(Modifier::BOLD),
            RunKind::Styled(children()),
        ),
        TokenKind::Strikethrough => (
            Style::default().add_modifier(Modifier::CROSSED_OUT),
            RunKind::Styled(children()),
        ),
        TokenKind::Link {
            href: Some(href), ..
        } => (
            styles.link,
            RunKind::Link {
                href: href.clone(),
                children: children(),
            },
        ),
        TokenKind::Link { href: None, .. } => (Style::default(), RunKind::Styled(children())),
        TokenKind::LineBreak => (Style::default(), RunKind::Text("\n".to_string())),
        TokenKind::Heading { .. }
        | TokenKind::Paragraph
        | TokenKind::CodeBlock { .. }
        | TokenKind::List { .. }
        | TokenKind::ListItem { .. }
        | TokenKind::HorizontalRule
        | TokenKind::BlockQuote
        | TokenKind::Space
        | TokenKind::Unrecognized(_) => {
            let text = token.text.as_ref()?;
            (Style::default(), RunKind::Text(text.clone()))
        }
    };
    Some(run)
}

/// Flattens runs into spans, composing each run's style onto `base`.
pub fn runs_to_spans(runs: &[Run], base: Style) -> Vec<Span<'static>> {
    let mut out = Vec::new();
    push_spans(&mut out, runs, base);
    out
}

fn push_spans(out: &mut Vec<Span<'static>>, runs: &[Run], base: Style) {
    for run in runs {
        let style = base.patch(run.style);
        match &run.kind {
            RunKind::Text(text) => {
                if !text.is_empty() {
                    out.push(Span::styled(text.clone(), style));
                }
            }
            RunKind::Styled(children) | RunKind::Link { children, .. } => {
                push_spans(out, children, style)
            }
        }
    }
}

/// Appends `runs` to `out`, re-keying them by their new position.
pub(crate) fn append_runs(out: &mut Vec<Run>, runs: Vec<Run>) {
    for mut run in runs {
        run.key = out.len();
        out.push(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmark_core::link::RecordingOpener;

    fn styled(kind: TokenKind, children: Vec<Token>) -> Token {
        Token::with_children(kind, children)
    }

    #[test]
    fn missing_or_empty_sequences_render_nothing() {
        let styles = MarkdownStyles::default();
        assert!(render_inline(None, &styles).is_empty());
        assert!(render_inline(Some(&[][..]), &styles).is_empty());
    }

    #[test]
    fn text_without_content_is_empty_run() {
        let styles = MarkdownStyles::default();
        let runs = render_inline(Some(&[Token::new(TokenKind::Text)][..]), &styles);
        assert_eq!(runs, vec![Run::text(0, Style::default(), "")]);
    }

    #[test]
    fn strong_inside_emphasis_is_bold_and_italic() {
        let styles = MarkdownStyles::default();
        let tokens = vec![styled(TokenKind::Emphasis, vec![
            Token::plain("a "),
            styled(TokenKind::Strong, vec![Token::plain("b")]),
        ])];
        let runs = render_inline(Some(tokens.as_slice()), &styles);
        let spans = runs_to_spans(&runs, Style::default());
        assert_eq!(spans.len(), 2);
        assert!(spans[0].style.add_modifier.contains(Modifier::ITALIC));
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[1].content, "b");
        assert!(
            spans[1]
                .style
                .add_modifier
                .contains(Modifier::ITALIC | Modifier::BOLD)
        );
    }

    #[test]
    fn strikethrough_composes_with_strong() {
        let styles = MarkdownStyles::default();
        let tokens = vec![styled(TokenKind::Strong, vec![styled(
            TokenKind::Strikethrough,
            vec![Token::plain("gone")],
        )])];
        let runs = render_inline(Some(tokens.as_slice()), &styles);
        let spans = runs_to_spans(&runs, Style::default());
        assert!(
            spans[0]
                .style
                .add_modifier
                .contains(Modifier::BOLD | Modifier::CROSSED_OUT)
        );
    }

    #[test]
    fn code_span_uses_code_style() {
        let styles = MarkdownStyles::default();
        let tokens = vec![Token::with_text(TokenKind::CodeSpan, "x")];
        let runs = render_inline(Some(tokens.as_slice()), &styles);
        assert_eq!(runs, vec![Run::text(0, styles.code_inline, "x")]);
    }

    #[test]
    fn link_activation_opens_href() {
        let styles = MarkdownStyles::default();
        let tokens = vec![styled(
            TokenKind::Link {
                href: Some("https://example.com".to_string()),
                title: None,
            },
            vec![Token::plain("Link")],
        )];
        let runs = render_inline(Some(tokens.as_slice()), &styles);
        assert_eq!(runs[0].style, styles.link);
        assert_eq!(
            runs[0].link_action(),
            Some(LinkAction::new("https://example.com", "Link"))
        );

        let opener = RecordingOpener::new();
        assert!(runs[0].activate(&opener));
        assert_eq!(opener.opened(), vec!["https://example.com".to_string()]);
    }

    #[test]
    fn link_without_href_is_inert() {
        let styles = MarkdownStyles::default();
        let tokens = vec![styled(
            TokenKind::Link {
                href: None,
                title: None,
            },
            vec![Token::plain("label")],
        )];
        let runs = render_inline(Some(tokens.as_slice()), &styles);
        assert_eq!(runs[0].style, Style::default());
        assert_eq!(runs[0].link_action(), None);
        let opener = RecordingOpener::new();
        assert!(!runs[0].activate(&opener));
        assert!(opener.opened().is_empty());
        assert_eq!(runs[0].plain_text(), "label");
    }

    #[test]
    fn line_break_is_newline_run() {
        let styles = MarkdownStyles::default();
        let tokens = vec![
            Token::plain("a"),
            Token::new(TokenKind::LineBreak),
            Token::plain("b"),
        ];
        let runs = render_inline(Some(tokens.as_slice()), &styles);
        assert_eq!(runs[1].plain_text(), "\n");
    }

    #[test]
    fn unknown_tokens_keep_literal_text_or_vanish() {
        let styles = MarkdownStyles::default();
        let tokens = vec![
            Token::with_text(TokenKind::Unrecognized("html".to_string()), "<kbd>"),
            Token::new(TokenKind::Unrecognized("mystery".to_string())),
            Token::plain("x"),
        ];
        let runs = render_inline(Some(tokens.as_slice()), &styles);
        assert_eq!(runs, vec![
            Run::text(0, Style::default(), "<kbd>"),
            Run::text(1, Style::default(), "x"),
        ]);
    }

    #[test]
    fn keys_follow_output_positions() {
        let styles = MarkdownStyles::default();
        let tokens = vec![
            Token::plain("a"),
            styled(TokenKind::Emphasis, vec![Token::plain("b"), Token::plain("c")]),
        ];
        let runs = render_inline(Some(tokens.as_slice()), &styles);
        assert_eq!(runs.iter().map(|r| r.key).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(
            runs[1].children().iter().map(|r| r.key).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }
}
