use chatmark_core::link::LinkAction;
use chatmark_core::theme::Theme;
use chatmark_markdown::RenderedMarkdown;
use chatmark_markdown::options::MarkdownRenderOptions;
use chatmark_markdown::options::MarkdownStyles;
use chatmark_markdown::render_markdown;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::text::Text;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

/// Sidebar titles keep this many characters of the first message.
pub const TITLE_CHARS: usize = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Title for a chat whose first message is `first_message`.
///
/// The title is the first [`TITLE_CHARS`] characters of the message, untrimmed, always followed
/// by `...`.
pub fn chat_title(first_message: &str) -> String {
    let mut title: String = first_message.chars().take(TITLE_CHARS).collect();
    title.push_str("...");
    title
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptStyles {
    pub markdown: MarkdownStyles,
    pub user_label: Style,
    pub assistant_label: Style,
    pub separator: Style,
}

impl Default for TranscriptStyles {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

impl TranscriptStyles {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            markdown: MarkdownStyles::from_theme(theme),
            user_label: theme.accent.add_modifier(Modifier::BOLD),
            assistant_label: theme.text_primary.add_modifier(Modifier::BOLD),
            separator: theme.text_muted,
        }
    }

    fn label(&self, role: Role) -> Style {
        match role {
            Role::User => self.user_label,
            Role::Assistant => self.assistant_label,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranscriptOptions {
    pub markdown: MarkdownRenderOptions,
    /// Only render the most recent `n` messages.
    pub max_entries: Option<usize>,
}

/// One message after markdown rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMessage {
    pub role: Role,
    pub body: RenderedMarkdown,
}

impl RenderedMessage {
    pub fn links(&self) -> Vec<LinkAction> {
        self.body.links()
    }
}

/// Renders every message's content through the markdown renderer, preserving order.
///
/// Messages are independent: a message that fails to parse renders as an error block without
/// affecting its neighbours.
pub fn render_transcript(
    messages: &[ChatMessage],
    styles: &TranscriptStyles,
    options: &TranscriptOptions,
) -> Vec<RenderedMessage> {
    let skip = options
        .max_entries
        .map(|max| messages.len().saturating_sub(max))
        .unwrap_or(0);
    if skip > 0 {
        debug!(skipped = skip, "trimming oldest transcript entries");
    }
    messages[skip..]
        .iter()
        .map(|m| RenderedMessage {
            role: m.role,
            body: render_markdown(&m.content, &styles.markdown, &options.markdown),
        })
        .collect()
}

/// Lays rendered messages out as a labelled transcript.
///
/// Every line gets a `"<LABEL> │ "` gutter; the label is shown on the first line of each
/// message only, and messages are separated by a blank gutter line.
pub fn transcript_text(messages: &[RenderedMessage], styles: &TranscriptStyles) -> Text<'static> {
    let gutter_width = messages
        .iter()
        .map(|m| UnicodeWidthStr::width(m.role.label()))
        .max()
        .unwrap_or(0)
        .max(4);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(blank_prefix(gutter_width, styles)));
        }
        let body = message.body.to_lines().lines;
        let body = if body.is_empty() {
            vec![Line::default()]
        } else {
            body
        };
        for (n, line) in body.into_iter().enumerate() {
            let mut spans = if n == 0 {
                label_prefix(message.role, gutter_width, styles)
            } else {
                blank_prefix(gutter_width, styles)
            };
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
    }
    Text::from(lines)
}

fn label_prefix(role: Role, gutter_width: usize, styles: &TranscriptStyles) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!("{:>width$}", role.label(), width = gutter_width),
            styles.label(role),
        ),
        Span::styled(" │ ".to_string(), styles.separator),
    ]
}

fn blank_prefix(gutter_width: usize, styles: &TranscriptStyles) -> Vec<Span<'static>> {
    vec![
        Span::styled(" ".repeat(gutter_width), styles.separator),
        Span::styled(" │ ".to_string(), styles.separator),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn renders_messages_in_order() {
        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("# Answer\n\n**bold**"),
        ];
        let styles = TranscriptStyles::default();
        let rendered = render_transcript(&messages, &styles, &TranscriptOptions::default());
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].role, Role::User);
        assert_eq!(rendered[1].body.blocks().len(), 2);

        let lines = plain(&transcript_text(&rendered, &styles));
        assert_eq!(lines, vec![
            "     USER │ hi",
            "          │",
            "ASSISTANT │ Answer",
            "          │",
            "          │ bold",
        ]);
    }

    #[test]
    fn empty_message_still_gets_a_label() {
        let rendered = render_transcript(
            &[ChatMessage::user("")],
            &TranscriptStyles::default(),
            &TranscriptOptions::default(),
        );
        let lines = plain(&transcript_text(&rendered, &TranscriptStyles::default()));
        assert_eq!(lines, vec!["USER │"]);
    }

    #[test]
    fn max_entries_keeps_most_recent() {
        let messages = vec![
            ChatMessage::user("1"),
            ChatMessage::assistant("2"),
            ChatMessage::user("3"),
        ];
        let rendered = render_transcript(
            &messages,
            &TranscriptStyles::default(),
            &TranscriptOptions {
                max_entries: Some(2),
                ..TranscriptOptions::default()
            },
        );
        let bodies: Vec<_> = rendered.iter().map(|m| m.body.plain_text()).collect();
        assert_eq!(bodies, vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn collects_links_per_message() {
        let rendered = render_transcript(
            &[ChatMessage::assistant(
                "[Click here to open Google](https://www.google.com)",
            )],
            &TranscriptStyles::default(),
            &TranscriptOptions::default(),
        );
        assert_eq!(rendered[0].links(), vec![LinkAction::new(
            "https://www.google.com",
            "Click here to open Google"
        )]);
    }

    #[test]
    fn titles_keep_thirty_chars_and_always_end_with_ellipsis() {
        assert_eq!(
            chat_title("How do I write a markdown renderer in Rust?"),
            "How do I write a markdown rend..."
        );
        assert_eq!(chat_title("hi there"), "hi there...");
        assert_eq!(chat_title(""), "...");
        let exact = "a".repeat(TITLE_CHARS);
        assert_eq!(chat_title(&exact), format!("{exact}..."));
        assert_eq!(chat_title("ééééééééééééééééééééééééééééééééé").chars().count(), 33);
    }

    #[test]
    fn titles_keep_surrounding_whitespace() {
        assert_eq!(chat_title("  hi  "), "  hi  ...");
    }
}
