use ratatui::style::Style;

/// Color palette shared by every chatmark renderer.
///
/// Renderers never read a global palette; callers pass a `Theme` (or styles derived from one)
/// into each render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub danger: Style,
    pub code_inline: Style,
    pub code_block: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            danger: Style::default().red(),
            code_inline: Style::default().cyan(),
            code_block: Style::default().yellow(),
        }
    }
}

impl Theme {
    /// A palette with no colors at all, useful for snapshotting plain output.
    pub fn plain() -> Self {
        Self {
            text_primary: Style::default(),
            text_muted: Style::default(),
            accent: Style::default(),
            danger: Style::default(),
            code_inline: Style::default(),
            code_block: Style::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn default_theme_colors_accents() {
        let theme = Theme::default();
        assert_eq!(theme.accent.fg, Some(Color::Cyan));
        assert_eq!(theme.danger.fg, Some(Color::Red));
        assert_eq!(theme.text_primary, Style::default());
    }

    #[test]
    fn plain_theme_has_no_colors() {
        let theme = Theme::plain();
        assert_eq!(theme.code_block.fg, None);
        assert_eq!(theme.accent, Style::default());
    }
}
