//! Fragment, notes, and image directive parsing.
//!
//! Slides carry three inline directives: `<!-- fragment -->` marker lines
//! splitting the body into progressive-reveal segments, one
//! `<!-- notes: ... -->` block holding speaker notes, and standard
//! Markdown image syntax located here for later path resolution.

use std::sync::LazyLock;

use regex::Regex;

/// A fragment-separator line: nothing on the line but the marker.
static FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*<!--\s*fragment\s*-->[ \t]*$").expect("valid regex")
});

/// Speaker-notes directive, captured with surrounding whitespace trimmed.
static NOTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<!--\s*notes:\s*(.*?)\s*-->").expect("valid regex"));

/// Markdown image syntax `![alt](path)`.
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("valid regex"));

/// A leading level-1 heading line.
static LEADING_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+.+\n?").expect("valid regex"));

/// An embedded image reference, with its exact source span retained so the
/// renderer can substitute it with a placeholder token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// The full `![alt](path)` text as written.
    pub source: String,
    /// Alt text; `"Image"` when the source left it empty.
    pub alt_text: String,
    /// Path or URL exactly as written, unresolved.
    pub image_path: String,
}

/// Split a slide body into reveal fragments.
///
/// Segments are trimmed and empty ones dropped; a body with no separator
/// (or nothing but separators) comes back as a single segment holding the
/// whole trimmed body.
pub fn parse_fragments(body: &str) -> Vec<String> {
    let fragments: Vec<String> = FRAGMENT_RE
        .split(body)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    if fragments.is_empty() {
        vec![body.trim().to_string()]
    } else {
        fragments
    }
}

/// Extract the speaker-notes directive from a raw body, if present.
pub fn parse_notes(raw: &str) -> Option<String> {
    NOTES_RE
        .captures(raw)
        .map(|caps| caps[1].trim().to_string())
}

/// Remove every speaker-notes directive from a body and trim the result.
pub fn strip_notes(raw: &str) -> String {
    NOTES_RE.replace_all(raw, "").trim().to_string()
}

/// Locate all image references in a body, in source order.
pub fn parse_image_refs(body: &str) -> Vec<ImageRef> {
    IMAGE_RE
        .captures_iter(body)
        .map(|caps| {
            let alt = caps[1].trim();
            ImageRef {
                source: caps[0].to_string(),
                alt_text: if alt.is_empty() {
                    "Image".to_string()
                } else {
                    alt.to_string()
                },
                image_path: caps[2].to_string(),
            }
        })
        .collect()
}

/// Strip one leading `# ...` heading line; the slide header displays it.
pub fn strip_leading_heading(content: &str) -> &str {
    LEADING_HEADING_RE
        .find(content)
        .map_or(content, |m| &content[m.end()..])
}

/// First level-1 heading anywhere in the content, used as a display title
/// when front matter carries none.
pub fn first_level1_heading(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragments_splits_on_marker_lines() {
        let body = "A\n<!--fragment-->\nB\n<!--fragment-->\nC";
        assert_eq!(parse_fragments(body), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_parse_fragments_marker_is_case_insensitive() {
        let body = "first\n<!-- FRAGMENT -->\nsecond";
        assert_eq!(parse_fragments(body), vec!["first", "second"]);
    }

    #[test]
    fn test_parse_fragments_without_separator_returns_whole() {
        assert_eq!(parse_fragments("  just one\nblock  "), vec!["just one\nblock"]);
    }

    #[test]
    fn test_parse_fragments_empty_body() {
        assert_eq!(parse_fragments(""), vec![String::new()]);
    }

    #[test]
    fn test_parse_fragments_drops_empty_segments() {
        let body = "A\n<!--fragment-->\n<!--fragment-->\nB";
        assert_eq!(parse_fragments(body), vec!["A", "B"]);
    }

    #[test]
    fn test_inline_marker_does_not_split() {
        // The marker only separates when it is alone on its line.
        let body = "before <!--fragment--> after";
        assert_eq!(parse_fragments(body), vec![body]);
    }

    #[test]
    fn test_parse_notes_extracts_and_trims() {
        let raw = "Body\n\n<!-- notes: Remember to breathe. -->\nMore";
        assert_eq!(parse_notes(raw), Some("Remember to breathe.".to_string()));
    }

    #[test]
    fn test_parse_notes_multiline() {
        let raw = "<!-- notes:\nline one\nline two\n-->";
        assert_eq!(parse_notes(raw), Some("line one\nline two".to_string()));
    }

    #[test]
    fn test_parse_notes_absent() {
        assert_eq!(parse_notes("no directives here"), None);
    }

    #[test]
    fn test_strip_notes_round_trip() {
        let raw = "Heading\n\n<!-- notes: secret -->\n\nBody";
        let stripped = strip_notes(raw);
        assert!(!stripped.contains("notes:"));
        assert_eq!(parse_notes(&stripped), None);
        assert_eq!(stripped, "Heading\n\n\n\nBody");
    }

    #[test]
    fn test_parse_image_refs_defaults_alt() {
        let refs = parse_image_refs("![](pic.png) and ![Chart](a/b.jpg)");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].alt_text, "Image");
        assert_eq!(refs[0].image_path, "pic.png");
        assert_eq!(refs[1].alt_text, "Chart");
        assert_eq!(refs[1].source, "![Chart](a/b.jpg)");
    }

    #[test]
    fn test_strip_leading_heading() {
        assert_eq!(strip_leading_heading("# Title\nBody"), "Body");
        assert_eq!(strip_leading_heading("Body only"), "Body only");
        // Level-2 headings stay.
        assert_eq!(strip_leading_heading("## Sub\nBody"), "## Sub\nBody");
    }

    #[test]
    fn test_first_level1_heading() {
        assert_eq!(first_level1_heading("para\n# Late Title\nmore"), Some("Late Title"));
        assert_eq!(first_level1_heading("## only sub"), None);
    }
}
