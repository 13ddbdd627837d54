//! Deck discovery and loading.
//!
//! A deck is either a directory of `*.md` / `*.cast` files played in
//! filename order, or a single Markdown document split into slides on
//! `---` separator lines. Validation failures carry the full message
//! shown to the user; content-level problems (bad metadata values,
//! missing notes) degrade silently instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use thiserror::Error;

use crate::deck::fragments::{first_level1_heading, parse_notes, strip_notes};
use crate::deck::frontmatter::{metadata_only_segment, parse_front_matter};
use crate::deck::slide::{Slide, SlideId, SlideMetadata, title_from_filename};

/// Preferred deck directory when no path is given on the command line.
pub const DOT_DECK_DIR: &str = ".deck";
/// Fallback deck directory, auto-created with a starter slide.
pub const DEFAULT_SLIDES_DIR: &str = "slides";

const STARTER_SLIDE: &str = "01_intro.md";
const STARTER_CONTENT: &str = "# Welcome\n\nPress Space to scroll, arrows to navigate.\n";

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^-{3,}[ \t]*\r?$").expect("valid regex"));

/// Where the slides come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckSource {
    /// A directory of individual `.md` / `.cast` slide files.
    Directory(PathBuf),
    /// A single multi-slide Markdown document.
    Document(PathBuf),
}

impl DeckSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::Document(path) => path,
        }
    }

    /// Directory the live-reload watcher should observe.
    pub fn watch_dir(&self) -> &Path {
        match self {
            Self::Directory(path) => path,
            Self::Document(path) => path.parent().unwrap_or_else(|| Path::new(".")),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error(
        "Slides directory not found: {0}\n\nPlease provide a valid path to a directory containing .md or .cast files."
    )]
    DirNotFound(String),
    #[error("Path is not a directory: {0}")]
    NotADirectory(String),
    #[error(
        "No slides found in: {0}\n\nThe directory should contain .md (Markdown) or .cast (Asciinema) files.\nFiles are sorted alphabetically, so prefix them with numbers (e.g., 01_intro.md)."
    )]
    NoSlides(String),
    #[error(
        "Slide document not found: {0}\n\nPlease provide a valid path to a Markdown file or slides directory."
    )]
    DocumentNotFound(String),
    #[error(
        "No slides found in: {0}\n\nThe document should contain Markdown content; separate slides with `---` lines."
    )]
    EmptyDocument(String),
}

/// Resolve the CLI path argument to a deck source, relative to the
/// current directory.
pub fn resolve_source(arg: Option<&str>) -> Result<DeckSource> {
    let base = std::env::current_dir().context("Failed to resolve current directory")?;
    resolve_source_in(&base, arg)
}

/// Resolution rules: an explicit `.md` file is a single-document deck and
/// any other explicit path is taken as a directory. With no argument,
/// `.deck/` wins if present, otherwise `slides/` is used and created
/// (with a starter slide) if missing. Only that default ever gets
/// auto-provisioned.
pub fn resolve_source_in(base: &Path, arg: Option<&str>) -> Result<DeckSource> {
    if let Some(arg) = arg {
        let path = base.join(arg);
        if path.extension().is_some_and(|ext| ext == "md") && path.is_file() {
            return Ok(DeckSource::Document(path));
        }
        return Ok(DeckSource::Directory(path));
    }

    let dot_deck = base.join(DOT_DECK_DIR);
    if dot_deck.is_dir() {
        return Ok(DeckSource::Directory(dot_deck));
    }

    let slides = base.join(DEFAULT_SLIDES_DIR);
    if !slides.exists() {
        fs::create_dir_all(&slides)
            .with_context(|| format!("Failed to create slides directory {}", slides.display()))?;
        fs::write(slides.join(STARTER_SLIDE), STARTER_CONTENT)
            .with_context(|| format!("Failed to write starter slide in {}", slides.display()))?;
    }
    Ok(DeckSource::Directory(slides))
}

/// Check that the source exists and can yield slides. Fatal on failure.
pub fn validate(source: &DeckSource) -> Result<(), DeckError> {
    match source {
        DeckSource::Directory(path) => {
            if !path.exists() {
                return Err(DeckError::DirNotFound(display_path(path)));
            }
            if !path.is_dir() {
                return Err(DeckError::NotADirectory(display_path(path)));
            }
            if collect_slide_files(path).is_empty() {
                return Err(DeckError::NoSlides(display_path(path)));
            }
            Ok(())
        }
        DeckSource::Document(path) => {
            if path.is_file() {
                Ok(())
            } else {
                Err(DeckError::DocumentNotFound(display_path(path)))
            }
        }
    }
}

/// Load every visible slide from the source, in presentation order.
pub fn load(source: &DeckSource) -> Result<Vec<Slide>> {
    let mut slides = match source {
        DeckSource::Directory(path) => load_directory(path)?,
        DeckSource::Document(path) => load_document(path)?,
    };
    slides.retain(|slide| !slide.metadata().is_hidden());
    Ok(slides)
}

fn load_directory(dir: &Path) -> Result<Vec<Slide>> {
    let mut slides = Vec::new();
    for path in collect_slide_files(dir) {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if path.extension().is_some_and(|ext| ext == "cast") {
            slides.push(Slide::Cast {
                id: SlideId::new(&file_name),
                title: title_from_filename(&file_name),
                metadata: SlideMetadata::default(),
                notes: String::new(),
                path: std::path::absolute(&path).unwrap_or(path),
            });
            continue;
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read slide {}", path.display()))?;
        let (metadata, body) = parse_front_matter(&raw);
        let notes = parse_notes(body)
            .or_else(|| metadata.notes.clone())
            .unwrap_or_default();
        let content = strip_notes(body);
        let title = metadata
            .title
            .clone()
            .unwrap_or_else(|| title_from_filename(&file_name));
        slides.push(Slide::Markdown {
            id: SlideId::new(&file_name),
            title,
            metadata,
            notes,
            content,
            slide_dir: slide_dir_of(&path),
        });
    }
    Ok(slides)
}

fn load_document(path: &Path) -> Result<Vec<Slide>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read slide document {}", path.display()))?;
    let (defaults, body) = parse_front_matter(&raw);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let slide_dir = slide_dir_of(path);

    let mut slides = Vec::new();
    // A separator-delimited segment made only of `key: value` lines is not
    // a slide; it overrides metadata for the segment that follows it.
    let mut pending: Option<SlideMetadata> = None;
    let mut ordinal = 0usize;
    for segment in SEPARATOR_RE.split(body) {
        if segment.trim().is_empty() {
            continue;
        }
        if let Some(local) = metadata_only_segment(segment) {
            pending = Some(local);
            continue;
        }
        ordinal += 1;
        let metadata = pending.take().unwrap_or_default().merged_over(&defaults);
        let notes = parse_notes(segment)
            .or_else(|| metadata.notes.clone())
            .unwrap_or_default();
        let content = strip_notes(segment);
        let title = metadata
            .title
            .clone()
            .or_else(|| first_level1_heading(&content).map(ToOwned::to_owned))
            .unwrap_or_else(|| format!("Slide {ordinal}"));
        slides.push(Slide::Markdown {
            id: SlideId::new(format!("{file_name}#{ordinal}")),
            title,
            metadata,
            notes,
            content,
            slide_dir: slide_dir.clone(),
        });
    }

    if slides.is_empty() {
        return Err(DeckError::EmptyDocument(display_path(path)).into());
    }
    Ok(slides)
}

fn collect_slide_files(dir: &Path) -> Vec<PathBuf> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = Vec::new();
    for pattern in [format!("{escaped}/*.md"), format!("{escaped}/*.cast")] {
        if let Ok(paths) = glob::glob(&pattern) {
            files.extend(paths.filter_map(Result::ok));
        }
    }
    files.sort();
    files
}

fn slide_dir_of(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::path::absolute(parent).unwrap_or_else(|_| parent.to_path_buf())
}

fn display_path(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
