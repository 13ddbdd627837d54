//! Terminal UI rendering.
//!
//! This module contains all drawing code including:
//! - [`slide`]: Presentation view (header, body, scroll indicator)
//! - [`overview`]: Grid of all slides for quick navigation
//! - [`theme_select`]: Centered theme picker
//! - [`footer`]: Navigation hints and the slide counter
//! - [`theme`]: Theming and colors

pub mod theme;

mod footer;
mod overview;
mod slide;
mod theme_select;

use ratatui::Frame;
use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{Mode, Model};

pub use theme::Theme;

pub const OVERVIEW_CELL_WIDTH: u16 = 30;
pub const OVERVIEW_CELL_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 2;

/// Draw one frame from the model. Pure with respect to the model; all
/// state changes go through the update function.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let theme = Theme::of(model.active_theme());

    if model.slides.is_empty() {
        render_empty(model, frame, area, &theme);
        return;
    }

    match model.mode {
        Mode::ThemeSelect => theme_select::render(model, frame, area, &theme),
        Mode::Overview => overview::render(model, frame, area, &theme),
        Mode::Presentation => {
            let footer_height = FOOTER_HEIGHT.min(area.height);
            let slide_area = Rect {
                height: area.height - footer_height,
                ..area
            };
            let footer_area = Rect {
                y: area.y + area.height - footer_height,
                height: footer_height,
                ..area
            };
            slide::render(model, frame, slide_area, &theme);
            footer::render(model, frame, footer_area, &theme);
        }
    }
}

/// Startup validation rejects an empty deck, but a live reload can race a
/// directory move. Show guidance instead of a blank screen.
fn render_empty(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let dim = Style::default().fg(theme.dim);
    let lines = vec![
        Line::from(Span::styled(
            format!("No slides found in {}/", model.source.path().display()),
            Style::default().fg(Color::Yellow),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Add .md or .cast files to the slides directory.",
            dim,
        )),
        Line::from(Span::styled("Press q to quit.", dim)),
    ];
    let inner = area.inner(Margin::new(2, 1));
    frame.render_widget(Paragraph::new(lines), inner);
}
