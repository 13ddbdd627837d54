//! Inline image rendering.
//!
//! Images are drawn as upper-half-block cells: each terminal cell covers two
//! vertically stacked pixels, foreground for the top and background for the
//! bottom. Truecolor terminals get the raw RGB values; everything else is
//! quantized to the xterm-256 color cube. No terminal graphics protocol is
//! queried; this fallback works everywhere.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba};

use super::{InlineColor, InlineSpan, InlineStyle, LineKind, StyledLine};
use crate::deck::ImageRef;

/// Whether image and syntax colors should be emitted as 24-bit RGB.
pub fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("TERMDECK_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    width: u16,
    height: u16,
    truecolor: bool,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, Vec<StyledLine>>,
    order: VecDeque<CacheKey>,
}

/// Cache of rendered image blocks, keyed by path and target size.
///
/// Avoids re-decoding on every fragment step or scroll render.
#[derive(Debug, Default)]
pub struct ImageCache {
    inner: Arc<Mutex<CacheInner>>,
    max_size: usize,
}

impl ImageCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            max_size,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<Vec<StyledLine>> {
        let guard = self.inner.lock().ok()?;
        guard.entries.get(key).cloned()
    }

    fn insert(&self, key: CacheKey, lines: Vec<StyledLine>) {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if guard.entries.contains_key(&key) {
            guard.entries.insert(key, lines);
            return;
        }

        guard.order.push_back(key.clone());
        guard.entries.insert(key, lines);

        while guard.entries.len() > self.max_size {
            if let Some(oldest) = guard.order.pop_front() {
                guard.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        let guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render one image reference to display lines.
///
/// Never fails: remote URLs, missing files, and decode errors all degrade
/// to a one-line text placeholder.
pub(super) fn render_block(
    image: &ImageRef,
    slide_dir: &Path,
    max_width: u16,
    max_height: u16,
    truecolor: bool,
    cache: &ImageCache,
) -> Vec<StyledLine> {
    let source = image.image_path.as_str();
    if source.starts_with("http://") || source.starts_with("https://") {
        return vec![placeholder(format!(
            "[Image: {}] ({source})",
            image.alt_text
        ))];
    }

    let resolved = resolve_path(slide_dir, source);
    if !resolved.exists() {
        return vec![placeholder(format!(
            "[Image not found: {}] ({})",
            image.alt_text,
            resolved.display()
        ))];
    }

    let key = CacheKey {
        path: resolved.clone(),
        width: max_width,
        height: max_height,
        truecolor,
    };
    if let Some(lines) = cache.get(&key) {
        return lines;
    }

    let Ok(decoded) = image::open(&resolved) else {
        return vec![placeholder(format!(
            "[Image: {}] (failed to render)",
            image.alt_text
        ))];
    };
    let lines = half_block_lines(&decoded, max_width, max_height, truecolor);
    if lines.is_empty() {
        return vec![placeholder(format!(
            "[Image: {}] (failed to render)",
            image.alt_text
        ))];
    }
    cache.insert(key, lines.clone());
    lines
}

fn placeholder(text: String) -> StyledLine {
    StyledLine::new(text, LineKind::Image)
}

fn resolve_path(slide_dir: &Path, source: &str) -> PathBuf {
    let path = Path::new(source);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        slide_dir.join(path)
    }
}

fn half_block_lines(
    decoded: &DynamicImage,
    max_width: u16,
    max_height: u16,
    truecolor: bool,
) -> Vec<StyledLine> {
    if max_width == 0 || max_height == 0 {
        return Vec::new();
    }

    let (src_width, src_height) = decoded.dimensions();
    let bound_width = u32::from(max_width);
    let bound_height = u32::from(max_height) * 2;
    let rgba = if src_width > bound_width || src_height > bound_height {
        decoded
            .resize(bound_width, bound_height, FilterType::Lanczos3)
            .to_rgba8()
    } else {
        // Small images render at native size; upscaling only blurs them.
        decoded.to_rgba8()
    };

    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(height.div_ceil(2) as usize);
    let mut y = 0;
    while y < height {
        let mut content = String::with_capacity(width as usize);
        let mut spans = Vec::with_capacity(width as usize);
        for x in 0..width {
            let top = cell_color(rgba.get_pixel(x, y), truecolor);
            let bottom = if y + 1 < height {
                cell_color(rgba.get_pixel(x, y + 1), truecolor)
            } else {
                None
            };

            let (glyph, fg, bg) = match (top, bottom) {
                (None, None) => (' ', None, None),
                (Some(fg), None) => ('▀', Some(fg), None),
                (None, Some(fg)) => ('▄', Some(fg), None),
                (Some(fg), Some(bg)) => ('▀', Some(fg), Some(bg)),
            };
            content.push(glyph);
            spans.push(InlineSpan::new(
                glyph.to_string(),
                InlineStyle {
                    fg,
                    bg,
                    ..InlineStyle::default()
                },
            ));
        }
        lines.push(StyledLine::with_spans(content, LineKind::Image, spans));
        y += 2;
    }
    lines
}

fn cell_color(pixel: &Rgba<u8>, truecolor: bool) -> Option<InlineColor> {
    if pixel[3] < 128 {
        return None;
    }
    let color = InlineColor {
        r: pixel[0],
        g: pixel[1],
        b: pixel[2],
    };
    if truecolor {
        Some(color)
    } else {
        Some(quantize(color))
    }
}

/// Snap an RGB color to its nearest xterm-256 cube entry.
fn quantize(color: InlineColor) -> InlineColor {
    let (r, g, b) = xterm_256_to_rgb(rgb_to_xterm_256(color.r, color.g, color.b));
    InlineColor { r, g, b }
}

pub fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}

fn xterm_256_to_rgb(i: u8) -> (u8, u8, u8) {
    match i {
        0 => (0, 0, 0),
        1 => (205, 0, 0),
        2 => (0, 205, 0),
        3 => (205, 205, 0),
        4 => (0, 0, 238),
        5 => (205, 0, 205),
        6 => (0, 205, 205),
        7 => (229, 229, 229),
        8 => (127, 127, 127),
        9 => (255, 0, 0),
        10 => (0, 255, 0),
        11 => (255, 255, 0),
        12 => (92, 92, 255),
        13 => (255, 0, 255),
        14 => (0, 255, 255),
        15 => (255, 255, 255),
        16..=231 => {
            let i = i - 16;
            let r = (i / 36) % 6;
            let g = (i / 6) % 6;
            let b = i % 6;
            let to_val = |c: u8| if c == 0 { 0 } else { 55 + c * 40 };
            (to_val(r), to_val(g), to_val(b))
        }
        232..=255 => {
            let gray = 8 + (i - 232) * 10;
            (gray, gray, gray)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn image_ref(path: &str) -> ImageRef {
        ImageRef {
            source: format!("![Logo]({path})"),
            alt_text: "Logo".to_string(),
            image_path: path.to_string(),
        }
    }

    #[test]
    fn test_supports_truecolor_from_env_detects_24bit() {
        assert!(supports_truecolor_from_env(
            Some("truecolor"),
            Some("xterm-256color")
        ));
        assert!(supports_truecolor_from_env(Some("24BIT"), Some("screen")));
        assert!(supports_truecolor_from_env(None, Some("xterm-direct")));
    }

    #[test]
    fn test_supports_truecolor_from_env_rejects_plain() {
        assert!(!supports_truecolor_from_env(None, Some("xterm-256color")));
        assert!(!supports_truecolor_from_env(None, None));
    }

    #[test]
    fn test_rgb_to_xterm_256_cube_corners() {
        assert_eq!(rgb_to_xterm_256(0, 0, 0), 16);
        assert_eq!(rgb_to_xterm_256(255, 255, 255), 231);
        assert_eq!(rgb_to_xterm_256(255, 0, 0), 196);
    }

    #[test]
    fn test_quantize_is_idempotent() {
        let color = InlineColor {
            r: 200,
            g: 30,
            b: 40,
        };
        let once = quantize(color);
        assert_eq!(quantize(once), once);
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let cache = ImageCache::new(2);
        for n in 0..3u16 {
            let key = CacheKey {
                path: PathBuf::from(format!("/img/{n}.png")),
                width: 10,
                height: 10,
                truecolor: true,
            };
            cache.insert(key, Vec::new());
        }
        assert_eq!(cache.len(), 2);
        let first = CacheKey {
            path: PathBuf::from("/img/0.png"),
            width: 10,
            height: 10,
            truecolor: true,
        };
        assert!(cache.get(&first).is_none());
    }

    #[test]
    fn test_render_block_url_is_literal() {
        let cache = ImageCache::new(4);
        let lines = render_block(
            &image_ref("https://example.com/pic.png"),
            Path::new("/slides"),
            40,
            10,
            true,
            &cache,
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].content(),
            "[Image: Logo] (https://example.com/pic.png)"
        );
    }

    #[test]
    fn test_render_block_missing_file() {
        let cache = ImageCache::new(4);
        let dir = tempfile::tempdir().unwrap();
        let lines = render_block(&image_ref("nope.png"), dir.path(), 40, 10, true, &cache);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].content().starts_with("[Image not found: Logo] ("));
        assert!(lines[0].content().contains("nope.png"));
    }

    #[test]
    fn test_render_block_decodes_and_caches() {
        let cache = ImageCache::new(4);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let lines = render_block(&image_ref("dot.png"), dir.path(), 40, 10, true, &cache);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].content().chars().count(), 4);
        assert_eq!(cache.len(), 1);

        let again = render_block(&image_ref("dot.png"), dir.path(), 40, 10, true, &cache);
        assert_eq!(again, lines);
    }

    #[test]
    fn test_half_block_solid_cells_carry_both_colors() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255])));
        let lines = half_block_lines(&img, 10, 10, true);
        assert_eq!(lines.len(), 1);
        let spans = lines[0].spans().unwrap();
        assert_eq!(spans.len(), 2);
        for span in spans {
            assert_eq!(span.text(), "▀");
            assert_eq!(
                span.style().fg,
                Some(InlineColor {
                    r: 10,
                    g: 20,
                    b: 30
                })
            );
            assert_eq!(span.style().fg, span.style().bg);
        }
    }

    #[test]
    fn test_half_block_transparent_top_uses_lower_block() {
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let lines = half_block_lines(&DynamicImage::ImageRgba8(img), 10, 10, true);
        let spans = lines[0].spans().unwrap();
        assert_eq!(spans[0].text(), "▄");
        assert!(spans[0].style().fg.is_some());
        assert!(spans[0].style().bg.is_none());
    }

    #[test]
    fn test_half_block_quantizes_without_truecolor() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([200, 30, 40, 255])));
        let lines = half_block_lines(&img, 10, 10, false);
        let fg = lines[0].spans().unwrap()[0].style().fg.unwrap();
        assert_eq!(
            fg,
            quantize(InlineColor {
                r: 200,
                g: 30,
                b: 40
            })
        );
    }

    #[test]
    fn test_half_block_shrinks_large_images() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, Rgba([5, 5, 5, 255])));
        let lines = half_block_lines(&img, 20, 8, true);
        assert!(lines.len() <= 8);
        for line in &lines {
            assert!(line.content().chars().count() <= 20);
        }
    }
}
