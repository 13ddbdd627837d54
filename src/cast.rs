//! Cast header tooling.
//!
//! The first line of an asciinema recording is a JSON header carrying the
//! recorded terminal size. Before playback the header is rewritten so the
//! recording fits the presenting terminal; the copy goes to a temp file and
//! the source recording is never modified.
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::NamedTempFile;

/// Margin subtracted from each terminal dimension so the replay does not
/// press against the window edges.
const PLAYBACK_MARGIN: u16 = 4;

/// Terminal size assumed when the real size cannot be detected.
const FALLBACK_SIZE: (u16, u16) = (120, 40);

/// Dimensions a recording should be played at for a terminal of
/// `terminal_size` (cols, rows).
pub const fn target_size(terminal_size: Option<(u16, u16)>) -> (u16, u16) {
    let (cols, rows) = match terminal_size {
        Some(size) => size,
        None => FALLBACK_SIZE,
    };
    (
        cols.saturating_sub(PLAYBACK_MARGIN),
        rows.saturating_sub(PLAYBACK_MARGIN),
    )
}

/// Write a copy of the recording at `path` resized to fit `terminal_size`.
///
/// Returns `None` when the recording cannot be rewritten (unreadable file,
/// malformed or missing header); the caller should play the original file
/// unmodified. The temp file is deleted when the returned handle drops.
pub fn resized_copy(path: &Path, terminal_size: Option<(u16, u16)>) -> Option<NamedTempFile> {
    let (cols, rows) = target_size(terminal_size);
    match write_resized(path, cols, rows) {
        Ok(file) => Some(file),
        Err(err) => {
            tracing::warn!("playing {} at recorded size: {err:#}", path.display());
            None
        }
    }
}

fn write_resized(path: &Path, cols: u16, rows: u16) -> Result<NamedTempFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cast file {}", path.display()))?;
    let (first_line, rest) = content
        .split_once('\n')
        .unwrap_or((content.as_str(), ""));
    let header = rewrite_header(first_line, cols, rows)?;

    let mut file = tempfile::Builder::new()
        .prefix("termdeck-cast-")
        .suffix(".cast")
        .tempfile()
        .context("Failed to create temp cast file")?;
    file.write_all(header.as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .and_then(|()| file.write_all(rest.as_bytes()))
        .and_then(|()| file.flush())
        .context("Failed to write temp cast file")?;
    Ok(file)
}

/// Rewrite the dimension fields of a header line, preserving everything
/// else. asciinema v3 nests them under `term`; v1/v2 keep top-level
/// `width` / `height`.
fn rewrite_header(line: &str, cols: u16, rows: u16) -> Result<String> {
    let mut header: Value =
        serde_json::from_str(line).context("cast header is not valid JSON")?;
    let object = header
        .as_object_mut()
        .context("cast header is not a JSON object")?;

    if let Some(term) = object.get_mut("term").and_then(Value::as_object_mut) {
        term.insert("cols".to_owned(), Value::from(cols));
        term.insert("rows".to_owned(), Value::from(rows));
    } else {
        object.insert("width".to_owned(), Value::from(cols));
        object.insert("height".to_owned(), Value::from(rows));
    }

    serde_json::to_string(&header).context("Failed to serialize cast header")
}
