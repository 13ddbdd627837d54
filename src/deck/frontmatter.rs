//! Front-matter parsing for slide files.
//!
//! A front-matter block is a leading `---` line, `key: value` lines, and a
//! closing `---` line. Recognized keys: `title`, `subtitle`, `layout`,
//! `theme`, `hidden`, `notes`. Values may be quoted. Anything malformed is
//! skipped rather than reported; a missing closing delimiter means the
//! whole text is body.

use crate::deck::slide::{Layout, SlideMetadata, ThemeId};

const DELIMITER: &str = "---";

/// Split a slide source into its front matter and the remaining body.
pub fn parse_front_matter(text: &str) -> (SlideMetadata, &str) {
    let (first, mut rest) = split_line(text);
    if first.trim_end() != DELIMITER {
        return (SlideMetadata::default(), text);
    }

    let mut keyvals = Vec::new();
    while !rest.is_empty() {
        let (line, next) = split_line(rest);
        let line = line.trim_end();
        if line == DELIMITER {
            return (parse_metadata_lines(&keyvals), next);
        }
        keyvals.push(line);
        rest = next;
    }

    // Unterminated front matter: treat the whole text as body.
    (SlideMetadata::default(), text)
}

fn split_line(text: &str) -> (&str, &str) {
    text.split_once('\n').unwrap_or((text, ""))
}

/// Interpret a standalone segment as a metadata-only block.
///
/// Returns `Some` when every non-empty line is a recognized `key: value`
/// pair; single-document decks use such segments as local overrides for
/// the slide that follows them.
pub fn metadata_only_segment(segment: &str) -> Option<SlideMetadata> {
    let lines: Vec<&str> = segment
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }
    for line in &lines {
        let key = line.split_once(':').map(|(k, _)| k.trim())?;
        if !matches!(
            key,
            "title" | "subtitle" | "layout" | "theme" | "hidden" | "notes"
        ) {
            return None;
        }
    }
    Some(parse_metadata_lines(&lines))
}

fn parse_metadata_lines(lines: &[&str]) -> SlideMetadata {
    let mut metadata = SlideMetadata::default();
    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim() {
            "title" if !value.is_empty() => metadata.title = Some(value.to_string()),
            "subtitle" if !value.is_empty() => metadata.subtitle = Some(value.to_string()),
            "layout" => metadata.layout = Layout::parse(value),
            "theme" => metadata.theme = ThemeId::parse(value),
            "hidden" => {
                metadata.hidden = match value {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                };
            }
            "notes" if !value.is_empty() => metadata.notes = Some(value.to_string()),
            _ => {}
        }
    }
    metadata
}

fn unquote(value: &str) -> &str {
    let stripped = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')));
    stripped.unwrap_or(value)
}
