//! Theming and color definitions.
//!
//! Three built-in themes style rendered slide content and the UI chrome.
//! Colors stay within the ANSI / xterm-256 palette so they respect the
//! terminal's own scheme; RGB span colors (syntax highlighting, image
//! cells) degrade to the xterm-256 cube on terminals without truecolor.

use ratatui::style::{Color, Modifier, Style};

use crate::deck::ThemeId;
use crate::render::{InlineColor, InlineStyle, LineKind, rgb_to_xterm_256, supports_truecolor};

/// Resolved styles for one visual theme.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Slide header title line
    pub title: Style,
    /// Slide header subtitle line
    pub subtitle: Style,
    /// Heading level 1 (rare in a body; usually stripped into the header)
    pub h1: Style,
    /// Heading level 2 style
    pub h2: Style,
    /// Heading level 3 style
    pub h3: Style,
    /// Heading level 4+ style
    pub h4: Style,
    /// Plain paragraph text
    pub paragraph: Style,
    /// Fenced code block lines
    pub code: Style,
    /// Inline code style
    pub inline_code: Style,
    /// Block quote style
    pub quote: Style,
    /// Link style
    pub link: Style,
    /// Emphasis (italic) style
    pub emphasis: Style,
    /// Strong (bold) style
    pub strong: Style,
    /// Strikethrough style
    pub strikethrough: Style,
    /// List item lines
    pub list: Style,
    /// Table lines
    pub table: Style,
    /// Image placeholder text
    pub image: Style,
    /// Horizontal rule style
    pub hr: Style,
    /// Accent for borders
    pub border: Color,
    /// Highlight for selected or emphasized chrome
    pub highlight: Color,
    /// Plain chrome text
    pub text: Color,
    /// De-emphasized chrome (rules, hints, counters)
    pub dim: Color,
}

impl Theme {
    /// Resolve a theme id to its style table.
    pub fn of(id: ThemeId) -> Self {
        match id {
            ThemeId::Default => Self::default(),
            ThemeId::Neon => Self::neon(),
            ThemeId::Minimal => Self::minimal(),
        }
    }

    /// Bright magenta/green on dark.
    pub fn neon() -> Self {
        Self {
            title: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
            subtitle: Style::default()
                .fg(Color::Indexed(135))
                .add_modifier(Modifier::ITALIC),
            h1: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            h4: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            paragraph: Style::default(),
            code: Style::default().fg(Color::LightGreen).bg(Color::Indexed(234)),
            inline_code: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
            quote: Style::default()
                .fg(Color::Indexed(135))
                .add_modifier(Modifier::ITALIC),
            link: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::UNDERLINED),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            list: Style::default(),
            table: Style::default(),
            image: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::ITALIC),
            hr: Style::default().fg(Color::Indexed(135)),
            border: Color::LightMagenta,
            highlight: Color::LightGreen,
            text: Color::White,
            dim: Color::Indexed(60),
        }
    }

    /// Monochrome; structure carried by weight alone.
    pub fn minimal() -> Self {
        Self {
            title: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            subtitle: Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::ITALIC),
            h1: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Indexed(250))
                .add_modifier(Modifier::BOLD),
            h4: Style::default()
                .fg(Color::Indexed(250))
                .add_modifier(Modifier::BOLD),
            paragraph: Style::default(),
            code: Style::default().fg(Color::Indexed(250)),
            inline_code: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            quote: Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::ITALIC),
            link: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::UNDERLINED),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            list: Style::default(),
            table: Style::default(),
            image: Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::ITALIC),
            hr: Style::default().fg(Color::Indexed(240)),
            border: Color::Gray,
            highlight: Color::White,
            text: Color::Gray,
            dim: Color::Indexed(242),
        }
    }

    /// Get the style for a rendered line kind.
    pub const fn line_style(&self, kind: LineKind) -> Style {
        match kind {
            LineKind::Heading(1) => self.h1,
            LineKind::Heading(2) => self.h2,
            LineKind::Heading(3) => self.h3,
            LineKind::Heading(_) => self.h4,
            LineKind::CodeBlock => self.code,
            LineKind::BlockQuote => self.quote,
            LineKind::ListItem(_) => self.list,
            LineKind::Table => self.table,
            LineKind::HorizontalRule => self.hr,
            LineKind::Image => self.image,
            LineKind::Paragraph | LineKind::Empty => self.paragraph,
        }
    }

    /// Merge an inline span's flags and colors into a base line style.
    /// Explicit span colors win over theme accents.
    pub fn inline_style(&self, base: Style, inline: InlineStyle) -> Style {
        let mut style = base;

        if inline.emphasis {
            style = style.patch(self.emphasis);
        }
        if inline.strong {
            style = style.patch(self.strong);
        }
        if inline.strikethrough {
            style = style.patch(self.strikethrough);
        }
        if inline.link {
            style = style.patch(self.link);
        }
        if inline.code {
            style = style.patch(self.inline_code);
        }

        if let Some(fg) = inline.fg {
            style = style
                .fg(terminal_color(fg))
                .remove_modifier(Modifier::DIM);
        }
        if let Some(bg) = inline.bg {
            style = style.bg(terminal_color(bg));
        }

        style
    }
}

/// Bright cyan/white, the startup theme.
impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            subtitle: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            h1: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            h3: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            h4: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            paragraph: Style::default(),
            code: Style::default().fg(Color::Indexed(252)).bg(Color::Indexed(236)),
            inline_code: Style::default().fg(Color::LightYellow),
            quote: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            link: Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::UNDERLINED),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            list: Style::default(),
            table: Style::default(),
            image: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),
            hr: Style::default().fg(Color::DarkGray),
            border: Color::White,
            highlight: Color::LightCyan,
            text: Color::White,
            dim: Color::DarkGray,
        }
    }
}

fn terminal_color(color: InlineColor) -> Color {
    if supports_truecolor() {
        Color::Rgb(color.r, color.g, color.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(color.r, color.g, color.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_styles_are_bold() {
        for theme in [Theme::default(), Theme::neon(), Theme::minimal()] {
            for level in 1..=6 {
                let style = theme.line_style(LineKind::Heading(level));
                assert!(style.add_modifier.contains(Modifier::BOLD));
            }
        }
    }

    #[test]
    fn test_h1_is_underlined() {
        let style = Theme::default().line_style(LineKind::Heading(1));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_of_resolves_each_id() {
        assert_eq!(Theme::of(ThemeId::Neon).border, Color::LightMagenta);
        assert_eq!(Theme::of(ThemeId::Minimal).border, Color::Gray);
        assert_eq!(Theme::of(ThemeId::Default).border, Color::White);
    }

    #[test]
    fn test_inline_strong_becomes_bold() {
        let theme = Theme::default();
        let inline = InlineStyle {
            strong: true,
            ..InlineStyle::default()
        };
        let style = theme.inline_style(Style::default(), inline);
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_explicit_span_color_wins_over_link_accent() {
        let theme = Theme::default();
        let inline = InlineStyle {
            link: true,
            fg: Some(InlineColor { r: 10, g: 20, b: 30 }),
            ..InlineStyle::default()
        };
        let style = theme.inline_style(Style::default(), inline);
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert_ne!(style.fg, Some(Color::LightCyan));
    }

    #[test]
    fn test_explicit_span_color_removes_dim() {
        let theme = Theme::default();
        let base = Style::default().add_modifier(Modifier::DIM);
        let inline = InlineStyle {
            fg: Some(InlineColor { r: 255, g: 0, b: 0 }),
            ..InlineStyle::default()
        };
        let style = theme.inline_style(base, inline);
        assert!(!style.add_modifier.contains(Modifier::DIM));
    }
}
