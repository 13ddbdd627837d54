//! Slide content rendering.
//!
//! This module handles:
//! - Converting Markdown slide bodies to styled lines
//! - Inline image rendering with half-block cells
//! - The background render worker and its request/result protocol

mod image;
mod markdown;

pub use image::{ImageCache, rgb_to_xterm_256, supports_truecolor};
pub use markdown::to_styled_lines;

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use crate::deck::parse_image_refs;

/// A single display line of rendered slide content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    content: String,
    kind: LineKind,
    spans: Vec<InlineSpan>,
}

impl StyledLine {
    pub const fn new(content: String, kind: LineKind) -> Self {
        Self {
            content,
            kind,
            spans: Vec::new(),
        }
    }

    pub const fn with_spans(content: String, kind: LineKind, spans: Vec<InlineSpan>) -> Self {
        Self {
            content,
            kind,
            spans,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn kind(&self) -> LineKind {
        self.kind
    }

    /// Inline spans, if this line carries any.
    pub fn spans(&self) -> Option<&[InlineSpan]> {
        if self.spans.is_empty() {
            None
        } else {
            Some(&self.spans)
        }
    }
}

/// Kind of a rendered line, used for styling at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    CodeBlock,
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    Table,
    HorizontalRule,
    /// Half-block image cells or an image placeholder
    Image,
    Empty,
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    pub fg: Option<InlineColor>,
    pub bg: Option<InlineColor>,
}

/// RGB color carried on a span, resolved to a terminal color at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A styled inline span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// Target sizes for rendered content, derived from the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLayout {
    /// Wrap width for text content.
    pub content_width: u16,
    /// Maximum image width in cells.
    pub image_width: u16,
    /// Maximum image height in rows.
    pub image_height: u16,
}

impl RenderLayout {
    /// Content takes roughly two thirds of the terminal width; images are
    /// capped at the content column (at most 80 cells) and 60% of the rows
    /// left after the slide header and footer.
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_viewport(width: u16, height: u16) -> Self {
        let content_width = ((u32::from(width) * 2 / 3) as u16).max(20);
        let body_rows = height.saturating_sub(6);
        Self {
            content_width,
            image_width: content_width.min(80),
            image_height: (u32::from(body_rows) * 60 / 100) as u16,
        }
    }
}

/// A render job for the worker thread.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Monotonic sequence number; newest request wins.
    pub seq: u64,
    pub slide_index: usize,
    pub step: usize,
    /// Visible body text (fragments joined through the current step).
    pub body: String,
    /// Directory relative image paths resolve against.
    pub slide_dir: PathBuf,
    pub layout: RenderLayout,
    pub truecolor: bool,
}

/// A finished render, tagged with the request it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub seq: u64,
    pub slide_index: usize,
    pub step: usize,
    pub lines: Vec<StyledLine>,
}

/// Handle to the background render thread.
///
/// Dropping the handle closes the request channel and the worker exits.
pub struct RenderWorker {
    request_tx: mpsc::Sender<RenderRequest>,
    result_rx: mpsc::Receiver<RenderResult>,
}

impl RenderWorker {
    pub fn spawn() -> Self {
        let (request_tx, request_rx) = mpsc::channel::<RenderRequest>();
        let (result_tx, result_rx) = mpsc::channel::<RenderResult>();
        thread::spawn(move || {
            let cache = ImageCache::new(50);
            while let Ok(mut request) = request_rx.recv() {
                // Drain to the newest request; intermediate steps are
                // obsolete before they are ever drawn.
                while let Ok(newer) = request_rx.try_recv() {
                    request = newer;
                }
                let result = RenderResult {
                    seq: request.seq,
                    slide_index: request.slide_index,
                    step: request.step,
                    lines: render_lines(&request, &cache),
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });
        Self {
            request_tx,
            result_rx,
        }
    }

    pub fn request(&self, request: RenderRequest) {
        let _ = self.request_tx.send(request);
    }

    pub fn try_recv(&self) -> Option<RenderResult> {
        self.result_rx.try_recv().ok()
    }
}

/// Render a request to styled lines. Never fails: bad images degrade to
/// text placeholders.
pub fn render_lines(request: &RenderRequest, cache: &ImageCache) -> Vec<StyledLine> {
    let refs = parse_image_refs(&request.body);
    let mut lines = if refs.is_empty() {
        to_styled_lines(&request.body, request.layout.content_width)
    } else {
        render_with_images(request, cache, &refs)
    };
    while lines.last().is_some_and(|line| line.kind() == LineKind::Empty) {
        lines.pop();
    }
    lines
}

fn render_with_images(
    request: &RenderRequest,
    cache: &ImageCache,
    refs: &[crate::deck::ImageRef],
) -> Vec<StyledLine> {
    // Swap each image reference for an opaque marker so Markdown conversion
    // cannot reflow or restyle it, then splice the rendered blocks back in.
    let mut text = request.body.clone();
    let mut markers = Vec::with_capacity(refs.len());
    for (index, image) in refs.iter().enumerate() {
        let marker = format!("SLIDE-IMG-{index}-{}", request.seq);
        text = text.replacen(&image.source, &marker, 1);
        markers.push(marker);
    }

    let converted = to_styled_lines(&text, request.layout.content_width);
    let mut lines = Vec::with_capacity(converted.len());
    'line: for line in converted {
        for (index, marker) in markers.iter().enumerate() {
            if line.content().contains(marker.as_str()) {
                lines.extend(image::render_block(
                    &refs[index],
                    &request.slide_dir,
                    request.layout.image_width,
                    request.layout.image_height,
                    request.truecolor,
                    cache,
                ));
                continue 'line;
            }
        }
        lines.push(line);
    }
    lines
}
