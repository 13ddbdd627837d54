//! Slide deck discovery and parsing.
//!
//! This module handles:
//! - Resolving the deck source (a directory of slide files or one document)
//! - Parsing front matter, fragments, speaker notes, and image references
//! - Producing the ordered, visibility-filtered slide list

mod fragments;
mod frontmatter;
mod loader;
mod slide;

pub use fragments::{ImageRef, parse_fragments, parse_image_refs, parse_notes, strip_notes};
pub use loader::{
    DEFAULT_SLIDES_DIR, DOT_DECK_DIR, DeckError, DeckSource, load, resolve_source,
    resolve_source_in, validate,
};
pub use slide::{Layout, Slide, SlideId, SlideMetadata, ThemeId, title_from_filename};
