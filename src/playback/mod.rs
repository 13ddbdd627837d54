//! Cast playback sub-loop.
//!
//! Playing a recording hands the whole terminal to an external blocking
//! `asciinema` process; the interactive UI is torn down before entry and
//! re-initialized afterwards. After each replay a one-line footer is
//! printed and a single raw keypress decides where the interactive session
//! resumes.
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::Command;

use crossterm::terminal;
use unicode_width::UnicodeWidthStr;

use crate::cast;
use crate::deck::Slide;

/// Where a keypress after playback sends the presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavIntent {
    /// Right arrow: first non-cast slide after the current one.
    Next,
    /// Left arrow: first non-cast slide before the current one.
    Prev,
    /// `r`: play the same recording again.
    Replay,
    /// Anything else (including `q`, lone Esc, EOF): back to the
    /// placeholder for the current slide.
    Back,
}

/// Play the recording at `path` until the user navigates away.
///
/// Returns the slide index the interactive session should resume at.
pub fn run(slides: &[Slide], slide_index: usize, path: &Path) -> usize {
    loop {
        clear_screen();
        play_once(path);
        print_footer(slide_index, slides.len());

        match wait_for_key() {
            NavIntent::Next => return next_non_cast(slides, slide_index),
            NavIntent::Prev => return prev_non_cast(slides, slide_index),
            NavIntent::Replay => {}
            NavIntent::Back => return slide_index,
        }
    }
}

/// Invoke the external player once, blocking with the real terminal
/// attached. Failures are reported but never propagate; the footer and
/// keypress step still run so the user can navigate away.
fn play_once(path: &Path) {
    let resized = cast::resized_copy(path, terminal::size().ok());
    let play_path = resized.as_ref().map_or(path, tempfile::NamedTempFile::path);

    let status = Command::new("asciinema")
        .args(["play", "-q", "-i", "0.5", "-s", "1.5"])
        .arg(play_path)
        .status();
    match status {
        Ok(status) if !status.success() => {
            tracing::warn!("asciinema exited with {status}");
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!("failed to spawn asciinema: {err}");
            eprintln!("Error playing cast. Is 'asciinema' installed?");
        }
    }
}

fn clear_screen() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\x1b[2J\x1b[H");
    let _ = stdout.flush();
}

fn print_footer(slide_index: usize, total: usize) {
    let width = terminal::size().map_or(80, |(w, _)| usize::from(w));
    let dim = "\x1b[2m";
    let reset = "\x1b[0m";
    let rule = "─".repeat(width.saturating_sub(4));
    let hints = "← prev  → next  r replay  q back";
    let counter = format!("{}/{total}", slide_index + 1);
    let padding = " ".repeat(
        width
            .saturating_sub(4)
            .saturating_sub(hints.width())
            .saturating_sub(counter.len()),
    );

    println!("\n{dim}  {rule}{reset}");
    println!("{dim}  {hints}{padding}{counter}  {reset}");
}

/// Restores cooked input mode on drop so no exit path leaves the
/// terminal raw.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Block for one keypress and decode it.
///
/// Arrow sequences arrive as a single chunk from modern terminals, so one
/// read sees the whole sequence; a bare ESC byte is a lone Esc.
fn wait_for_key() -> NavIntent {
    let Ok(_guard) = RawModeGuard::enable() else {
        return NavIntent::Back;
    };
    let mut buf = [0u8; 16];
    match io::stdin().read(&mut buf) {
        Ok(read) => decode_key(&buf[..read]),
        Err(_) => NavIntent::Back,
    }
}

/// Decode a raw keypress buffer. Arrows are recognized in both normal
/// (`ESC [ C/D`) and application (`ESC O C/D`) mode.
fn decode_key(buf: &[u8]) -> NavIntent {
    // Zero bytes means EOF on stdin.
    let Some(&first) = buf.first() else {
        return NavIntent::Back;
    };
    if first == 0x1b && buf.len() >= 3 && (buf[1] == b'[' || buf[1] == b'O') {
        match buf[2] {
            b'C' => return NavIntent::Next,
            b'D' => return NavIntent::Prev,
            _ => {}
        }
    }
    match first {
        b'r' | b'R' => NavIntent::Replay,
        _ => NavIntent::Back,
    }
}

/// Index of the first non-cast slide after `index`, or `index` when none
/// exists. A cast slide is never resumed into directly; it has to be
/// re-entered by being played.
fn next_non_cast(slides: &[Slide], index: usize) -> usize {
    let mut next = index + 1;
    while next < slides.len() && slides[next].is_cast() {
        next += 1;
    }
    if next < slides.len() { next } else { index }
}

/// Index of the first non-cast slide before `index`, or `index` when none
/// exists.
fn prev_non_cast(slides: &[Slide], index: usize) -> usize {
    let mut prev = index;
    while prev > 0 {
        prev -= 1;
        if !slides[prev].is_cast() {
            return prev;
        }
    }
    index
}
