use chatmark_core::theme::Theme;
use ratatui::style::Modifier;
use ratatui::style::Style;

/// Options that affect tokenization.
///
/// Changing any of these requires re-parsing the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Turn soft line breaks into hard line breaks instead of spaces.
    pub preserve_new_lines: bool,
    /// Base used to resolve relative link destinations.
    pub base_url: Option<String>,
    /// Containers (block quotes, lists, emphasis, links, ...) opened deeper than this keep only
    /// their literal text.
    pub max_nesting_depth: usize,
    /// Reject sources longer than this many bytes.
    pub max_input_bytes: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            preserve_new_lines: false,
            base_url: None,
            max_nesting_depth: 64,
            max_input_bytes: None,
        }
    }
}

/// Render configuration for [`crate::document::MarkdownDocument`] and
/// [`crate::document::render_markdown`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownRenderOptions {
    pub parse: ParseOptions,
    /// Marker placed in front of every list row.
    pub bullet: String,
    /// Use `1.`, `2.`, ... for ordered lists instead of `bullet`.
    pub number_ordered_lists: bool,
    pub blockquote_prefix: String,
    pub code_block_indent: u16,
    /// Columns of indentation per nested list level.
    pub list_indent: u16,
    pub rule_width: u16,
}

impl Default for MarkdownRenderOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            bullet: "•".to_string(),
            number_ordered_lists: false,
            blockquote_prefix: "│ ".to_string(),
            code_block_indent: 4,
            list_indent: 2,
            rule_width: 40,
        }
    }
}

/// Per-node styles used by the renderer.
///
/// `headings[0]` is the style for depth 1. Depths without an entry use the last entry, i.e. the
/// smallest heading style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownStyles {
    pub paragraph: Style,
    pub headings: Vec<Style>,
    pub code_inline: Style,
    pub code_block: Style,
    pub link: Style,
    pub bullet: Style,
    pub list_item: Style,
    pub rule: Style,
    pub blockquote: Style,
    pub error: Style,
}

impl Default for MarkdownStyles {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

impl MarkdownStyles {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            paragraph: theme.text_primary,
            headings: vec![
                theme
                    .text_primary
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                theme.text_primary.add_modifier(Modifier::BOLD),
                theme.accent.add_modifier(Modifier::BOLD),
            ],
            code_inline: theme.code_inline,
            code_block: theme.code_block,
            link: theme.accent.add_modifier(Modifier::UNDERLINED),
            bullet: theme.text_primary,
            list_item: theme.text_primary,
            rule: theme.text_muted,
            blockquote: theme.text_muted.add_modifier(Modifier::ITALIC),
            error: theme.danger,
        }
    }

    /// Style bound to a heading `depth` (1-based).
    pub fn heading(&self, depth: u8) -> Style {
        let idx = usize::from(depth.max(1)) - 1;
        self.headings
            .get(idx)
            .or_else(|| self.headings.last())
            .copied()
            .unwrap_or(self.paragraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_depth_outside_table_uses_smallest_style() {
        let styles = MarkdownStyles::default();
        assert_eq!(styles.heading(1), styles.headings[0]);
        assert_eq!(styles.heading(3), styles.headings[2]);
        assert_eq!(styles.heading(6), styles.headings[2]);
    }

    #[test]
    fn heading_without_table_falls_back_to_paragraph() {
        let styles = MarkdownStyles {
            headings: Vec::new(),
            ..MarkdownStyles::default()
        };
        assert_eq!(styles.heading(2), styles.paragraph);
    }
}
