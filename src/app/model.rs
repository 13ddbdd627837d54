use std::path::PathBuf;

use crate::deck::{DeckSource, Slide, ThemeId};
use crate::render::RenderResult;
use crate::ui::OVERVIEW_CELL_WIDTH;

/// Rows reserved around the slide body (header block, scroll indicator,
/// footer). Must stay in sync with the slide view layout.
pub(super) const CHROME_ROWS: u16 = 6;

/// Which input map is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal slide-by-slide presentation.
    #[default]
    Presentation,
    /// Grid of all slides for quick navigation.
    Overview,
    /// Theme picker overlay; suspends the other modes' input.
    ThemeSelect,
}

/// How an interactive session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitAction {
    /// Leave the program.
    Quit,
    /// Hand the terminal to the external player for a recording.
    Play {
        /// Recording to play.
        path: PathBuf,
        /// Slide to resume at when playback navigation goes "back".
        slide_index: usize,
    },
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug)]
pub struct Model {
    /// Ordered, visibility-filtered slides.
    pub slides: Vec<Slide>,
    /// Where the slides came from; reloads re-read this.
    pub source: DeckSource,
    /// Current slide.
    pub index: usize,
    /// Current reveal step within the slide.
    pub step: usize,
    /// Active input mode.
    pub mode: Mode,
    /// Cursor in the overview grid; independent of `index` until confirmed.
    pub overview_selected: usize,
    /// Cursor in the theme picker.
    pub theme_cursor: usize,
    /// Session theme; front matter may override per slide.
    pub theme: ThemeId,
    /// Scroll offset into the rendered body, in lines.
    pub scroll: usize,
    /// Newest completed render, possibly for a stale (slide, step).
    pub rendered: Option<RenderResult>,
    /// Sequence number of the newest render request issued.
    pub render_seq: u64,
    /// Successful live reloads this session; drives the footer dot.
    pub reload_count: u64,
    /// Last slide index pushed to the presenter console.
    pub last_notified_index: Option<usize>,
    /// Terminal (width, height) in cells.
    pub terminal_size: (u16, u16),
    /// Set when the session is over; the event loop exits on it.
    pub exit: Option<ExitAction>,
}

impl Model {
    pub fn new(slides: Vec<Slide>, source: DeckSource, terminal_size: (u16, u16)) -> Self {
        Self {
            slides,
            source,
            terminal_size,
            ..Self::default()
        }
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.index)
    }

    /// Reveal steps of the current slide; a missing slide counts as one.
    pub fn total_steps(&self) -> usize {
        self.current_slide().map_or(1, Slide::total_steps)
    }

    /// Theme used for drawing: the slide's front-matter override when set,
    /// the session theme otherwise.
    pub fn active_theme(&self) -> ThemeId {
        self.current_slide()
            .and_then(|slide| slide.metadata().theme)
            .unwrap_or(self.theme)
    }

    /// The completed render matching the current (slide, step), if any.
    /// While this is `None` the slide view shows its loading placeholder.
    pub fn current_render(&self) -> Option<&RenderResult> {
        self.rendered
            .as_ref()
            .filter(|result| result.slide_index == self.index && result.step == self.step)
    }

    /// Whether a markdown render has been requested for the current
    /// position but has not arrived yet. The event loop polls faster
    /// while this holds.
    pub fn awaiting_render(&self) -> bool {
        self.current_render().is_none()
            && self
                .current_slide()
                .is_some_and(|slide| matches!(slide, Slide::Markdown { .. }))
    }

    /// Rows available for the slide body.
    pub fn body_rows(&self) -> u16 {
        self.terminal_size.1.saturating_sub(CHROME_ROWS)
    }

    pub fn max_scroll(&self) -> usize {
        let lines = self.current_render().map_or(0, |result| result.lines.len());
        lines.saturating_sub(usize::from(self.body_rows()))
    }

    pub fn can_scroll_up(&self) -> bool {
        self.scroll > 0
    }

    pub fn can_scroll_down(&self) -> bool {
        self.scroll < self.max_scroll()
    }

    /// Columns in the overview grid at the current terminal width.
    pub fn overview_columns(&self) -> usize {
        let width = usize::from(self.terminal_size.0);
        (width.saturating_sub(4) / usize::from(OVERVIEW_CELL_WIDTH + 2)).max(1)
    }
}

// Implement Default for Model to allow std::mem::take in the event loop.
impl Default for Model {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            source: DeckSource::Directory(PathBuf::new()),
            index: 0,
            step: 0,
            mode: Mode::Presentation,
            overview_selected: 0,
            theme_cursor: 0,
            theme: ThemeId::Default,
            scroll: 0,
            rendered: None,
            render_seq: 0,
            reload_count: 0,
            last_notified_index: None,
            terminal_size: (80, 24),
            exit: None,
        }
    }
}
