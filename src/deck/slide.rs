//! Core slide types.

use std::fmt;
use std::path::PathBuf;

use crate::deck::fragments::{first_level1_heading, parse_fragments, strip_leading_heading};

/// Identity of a slide within one load, wrapping its filename.
///
/// Directory slides use the plain file name (`01_intro.md`); slides split
/// out of a single document use `<document-filename>#<n>`. Lookup across
/// reloads is by position, with the id available where identity matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlideId(String);

impl SlideId {
    pub fn new(filename: impl Into<String>) -> Self {
        Self(filename.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content layout requested by front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Top-aligned centered content column.
    #[default]
    Default,
    /// Content block centered vertically as well.
    Center,
    /// Content column pinned to the left half of the terminal.
    Split,
}

impl Layout {
    /// Parse a front-matter value. Unrecognized values are discarded.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "center" => Some(Self::Center),
            "split" => Some(Self::Split),
            _ => None,
        }
    }
}

/// Color theme identifier, settable per slide or session-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeId {
    #[default]
    Default,
    Neon,
    Minimal,
}

impl ThemeId {
    pub const ALL: [Self; 3] = [Self::Default, Self::Neon, Self::Minimal];

    /// Parse a front-matter value. Unrecognized values are discarded.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "neon" => Some(Self::Neon),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Neon => "Neon",
            Self::Minimal => "Minimal",
        }
    }
}

/// Optional fields parsed from a slide's front-matter block.
///
/// Invalid enum values and non-boolean `hidden` values are treated as
/// unset, never as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideMetadata {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub layout: Option<Layout>,
    pub theme: Option<ThemeId>,
    pub hidden: Option<bool>,
    pub notes: Option<String>,
}

impl SlideMetadata {
    /// Overlay `self` on top of `defaults`: set fields win, unset fields
    /// fall back. `title` and `subtitle` never inherit — a document-wide
    /// title describes the deck, not each slide.
    pub fn merged_over(&self, defaults: &Self) -> Self {
        Self {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            layout: self.layout.or(defaults.layout),
            theme: self.theme.or(defaults.theme),
            hidden: self.hidden.or(defaults.hidden),
            notes: self.notes.clone().or_else(|| defaults.notes.clone()),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden == Some(true)
    }
}

/// One unit of presented content.
#[derive(Debug, Clone)]
pub enum Slide {
    /// A Markdown text slide.
    Markdown {
        id: SlideId,
        title: String,
        metadata: SlideMetadata,
        /// Speaker notes; empty when the slide has none.
        notes: String,
        /// Body with the notes directive stripped.
        content: String,
        /// Base directory for resolving relative image paths.
        slide_dir: PathBuf,
    },
    /// A terminal recording played by an external player.
    Cast {
        id: SlideId,
        title: String,
        metadata: SlideMetadata,
        notes: String,
        /// Path handed to the player; the file itself stays opaque.
        path: PathBuf,
    },
}

impl Slide {
    pub fn id(&self) -> &SlideId {
        match self {
            Self::Markdown { id, .. } | Self::Cast { id, .. } => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Markdown { title, .. } | Self::Cast { title, .. } => title,
        }
    }

    pub fn metadata(&self) -> &SlideMetadata {
        match self {
            Self::Markdown { metadata, .. } | Self::Cast { metadata, .. } => metadata,
        }
    }

    pub fn notes(&self) -> &str {
        match self {
            Self::Markdown { notes, .. } | Self::Cast { notes, .. } => notes,
        }
    }

    pub const fn is_cast(&self) -> bool {
        matches!(self, Self::Cast { .. })
    }

    /// Body text with a leading level-1 heading removed (the heading is
    /// displayed as the slide header instead).
    pub fn body(&self) -> &str {
        match self {
            Self::Markdown { content, .. } => strip_leading_heading(content),
            Self::Cast { .. } => "",
        }
    }

    /// Number of reveal steps: fragment count for Markdown, always at
    /// least 1; casts have exactly one step.
    pub fn total_steps(&self) -> usize {
        match self {
            Self::Markdown { .. } => parse_fragments(self.body()).len().max(1),
            Self::Cast { .. } => 1,
        }
    }

    /// Visible body text at reveal step `step`: fragments `0..=step`
    /// joined by blank lines. `step` beyond the last fragment shows all.
    pub fn visible_body(&self, step: usize) -> String {
        match self {
            Self::Markdown { .. } => {
                let fragments = parse_fragments(self.body());
                let end = (step + 1).min(fragments.len());
                fragments[..end].join("\n\n")
            }
            Self::Cast { .. } => String::new(),
        }
    }

    /// Header text shown above the body: front-matter title, else the
    /// first level-1 heading in the content, else the derived title.
    pub fn display_title(&self) -> &str {
        if let Some(title) = self.metadata().title.as_deref() {
            return title;
        }
        if let Self::Markdown { content, .. } = self
            && let Some(heading) = first_level1_heading(content)
        {
            return heading;
        }
        self.title()
    }
}

/// Derive a display title from a slide filename: drop the extension, a
/// leading numeric ordering prefix (`01_`, `2-`), then turn the remaining
/// separators into spaces.
pub fn title_from_filename(filename: &str) -> String {
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    let without_digits = stem.trim_start_matches(|c: char| c.is_ascii_digit());
    let stem = if without_digits.len() < stem.len()
        && (without_digits.starts_with('_') || without_digits.starts_with('-'))
    {
        &without_digits[1..]
    } else {
        stem
    };
    stem.replace(['_', '-'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markdown_slide(content: &str) -> Slide {
        Slide::Markdown {
            id: SlideId::new("01_test.md"),
            title: "test".to_string(),
            metadata: SlideMetadata::default(),
            notes: String::new(),
            content: content.to_string(),
            slide_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn test_title_from_filename_strips_prefix_and_extension() {
        assert_eq!(title_from_filename("01_intro.md"), "intro");
        assert_eq!(title_from_filename("02_demo.cast"), "demo");
        assert_eq!(title_from_filename("2-closing.md"), "closing");
    }

    #[test]
    fn test_title_from_filename_without_prefix() {
        assert_eq!(title_from_filename("intro.md"), "intro");
        assert_eq!(title_from_filename("my_big-talk.md"), "my big talk");
    }

    #[test]
    fn test_title_from_filename_digits_without_separator_kept() {
        assert_eq!(title_from_filename("01intro.md"), "01intro");
    }

    #[test]
    fn test_layout_parse_discards_unknown() {
        assert_eq!(Layout::parse("center"), Some(Layout::Center));
        assert_eq!(Layout::parse("sideways"), None);
    }

    #[test]
    fn test_theme_parse_discards_unknown() {
        assert_eq!(ThemeId::parse("neon"), Some(ThemeId::Neon));
        assert_eq!(ThemeId::parse("dark"), None);
    }

    #[test]
    fn test_total_steps_counts_fragments() {
        let slide = markdown_slide("A\n<!--fragment-->\nB\n<!--fragment-->\nC");
        assert_eq!(slide.total_steps(), 3);
    }

    #[test]
    fn test_total_steps_minimum_one() {
        let slide = markdown_slide("");
        assert_eq!(slide.total_steps(), 1);
    }

    #[test]
    fn test_total_steps_ignores_leading_heading() {
        // The heading line must not count toward the first fragment's text,
        // but the body after it is still one step.
        let slide = markdown_slide("# Title\n\nBody");
        assert_eq!(slide.total_steps(), 1);
        assert_eq!(slide.body(), "\nBody");
    }

    #[test]
    fn test_visible_body_joins_through_step() {
        let slide = markdown_slide("A\n<!--fragment-->\nB\n<!--fragment-->\nC");
        assert_eq!(slide.visible_body(0), "A");
        assert_eq!(slide.visible_body(1), "A\n\nB");
        assert_eq!(slide.visible_body(2), "A\n\nB\n\nC");
        assert_eq!(slide.visible_body(99), "A\n\nB\n\nC");
    }

    #[test]
    fn test_display_title_precedence() {
        let mut slide = markdown_slide("# Heading Title\n\nBody");
        assert_eq!(slide.display_title(), "Heading Title");

        if let Slide::Markdown { metadata, .. } = &mut slide {
            metadata.title = Some("Front Matter Title".to_string());
        }
        assert_eq!(slide.display_title(), "Front Matter Title");

        let plain = markdown_slide("Just body text");
        assert_eq!(plain.display_title(), "test");
    }

    #[test]
    fn test_cast_has_one_step() {
        let slide = Slide::Cast {
            id: SlideId::new("02_demo.cast"),
            title: "demo".to_string(),
            metadata: SlideMetadata::default(),
            notes: String::new(),
            path: PathBuf::from("02_demo.cast"),
        };
        assert_eq!(slide.total_steps(), 1);
        assert!(slide.is_cast());
    }

    #[test]
    fn test_metadata_merge_prefers_local() {
        let defaults = SlideMetadata {
            title: Some("Deck".to_string()),
            theme: Some(ThemeId::Neon),
            hidden: Some(false),
            ..SlideMetadata::default()
        };
        let local = SlideMetadata {
            theme: Some(ThemeId::Minimal),
            ..SlideMetadata::default()
        };
        let merged = local.merged_over(&defaults);
        // Title never inherits from document-wide front matter.
        assert_eq!(merged.title, None);
        assert_eq!(merged.theme, Some(ThemeId::Minimal));
        assert_eq!(merged.hidden, Some(false));
    }
}
